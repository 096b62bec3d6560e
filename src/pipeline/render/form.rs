//! The ACORD 25 page, section by section.
//!
//! Fixed furniture (header, footer) sits at fixed Y. Everything between
//! follows a running cursor, so optional rows push later sections down
//! instead of overlapping them.

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::geometry::*;
use super::layout::{wrap_text, CertificateLayout, Cursor, Font};
use super::modes::{
    prepare_fields, row_drawn, RenderMode, PLACEHOLDER_CONTACT, PLACEHOLDER_DATE,
    PLACEHOLDER_HOLDER, PLACEHOLDER_INSURED, PLACEHOLDER_PHONE, PLACEHOLDER_POLICY, PROJECT_ADDRESS,
    PROJECT_NAME,
};
use crate::models::{format_usd, Coverage, CoverageKind, FieldMap, InsurerMap};

pub const FORM_TITLE: &str = "CERTIFICATE OF LIABILITY INSURANCE";
pub const FORM_ID: &str = "ACORD 25 (2016/03)";

pub const DISCLAIMER: &str = "IMPORTANT: If the certificate holder is an ADDITIONAL INSURED, the policy(ies) must have \
ADDITIONAL INSURED provisions or be endorsed. If SUBROGATION IS WAIVED, subject to the terms and conditions of the \
policy, certain policies may require an endorsement. A statement on this certificate does not confer rights to the \
certificate holder in lieu of such endorsement(s).";

const CANCELLATION: &str = "SHOULD ANY OF THE ABOVE DESCRIBED POLICIES BE CANCELLED BEFORE THE EXPIRATION DATE \
THEREOF, NOTICE WILL BE DELIVERED IN ACCORDANCE WITH THE POLICY PROVISIONS.";

/// ACORD print order, which differs from `CoverageKind::ALL`.
const ROW_ORDER: [CoverageKind; 4] = [
    CoverageKind::General,
    CoverageKind::Auto,
    CoverageKind::Umbrella,
    CoverageKind::WorkersComp,
];

const ENDORSEMENT_BOXES: [(&str, &str); 3] = [
    ("additional_insured", "Additional Insured"),
    ("waiver_of_subrogation", "Waiver of Subrogation"),
    ("primary_non_contributory", "Primary and Non-Contributory"),
];

/// Workers comp limits mark, printed on the row baseline.
pub const PER_STATUTE: &str = "PER STATUTE";
const STATUTE_OFFSET: f32 = 8.0;

/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.55;

/// Row label as printed in the TYPE OF INSURANCE column. These are the
/// labels the extraction engine keys coverage blocks on.
pub fn row_label(kind: CoverageKind) -> &'static str {
    match kind {
        CoverageKind::General => "COMMERCIAL GENERAL LIABILITY",
        CoverageKind::Auto => "AUTOMOBILE LIABILITY",
        CoverageKind::Umbrella => "UMBRELLA LIAB",
        CoverageKind::WorkersComp => "WORKERS COMPENSATION",
    }
}

pub fn layout_certificate(fields: &FieldMap, mode: &RenderMode<'_>) -> CertificateLayout {
    layout_certificate_at(fields, mode, Utc::now().date_naive())
}

/// Lay out the form as of `today` (issue date and sample policy period).
pub fn layout_certificate_at(
    fields: &FieldMap,
    mode: &RenderMode<'_>,
    today: NaiveDate,
) -> CertificateLayout {
    let fields = prepare_fields(fields, mode, today);
    let mut layout = CertificateLayout::new(FORM_TITLE);

    draw_header(&mut layout, today);
    let mut cursor = Cursor::at(BODY_TOP);
    draw_parties(&mut layout, &fields, &mut cursor);
    draw_insurers(&mut layout, &fields, &mut cursor);
    let rows = draw_coverages(&mut layout, &fields, &mut cursor);
    draw_endorsement_boxes(&mut layout, &fields, &mut cursor);
    draw_holder_and_description(&mut layout, &fields, &mut cursor);
    draw_footer(&mut layout);

    info!(mode = mode.name(), rows, runs = layout.runs().len(), "Certificate laid out");
    layout
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_else(|| PLACEHOLDER_DATE.to_string())
}

fn centered_x(text: &str, size: f32) -> f32 {
    (PAGE_WIDTH - text.chars().count() as f32 * size * GLYPH_WIDTH) / 2.0
}

/// Non-empty lines of a multi-line field, capped.
fn field_lines(fields: &FieldMap, field: &str, cap: usize) -> Vec<String> {
    fields
        .text(field)
        .map(|t| {
            t.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .take(cap)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// One line of a variable-length column.
struct ColumnLine {
    /// Extra space above the line.
    gap: f32,
    step: f32,
    size: f32,
    font: Font,
    text: String,
}

impl ColumnLine {
    fn new(size: f32, font: Font, text: impl Into<String>) -> Self {
        Self { gap: 0.0, step: LINE, size, font, text: text.into() }
    }

    fn gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    fn step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }
}

/// Ends `text` with an ellipsis, keeping it within the column wrap width.
fn ellipsize(text: &str) -> String {
    let kept: String = text.chars().take(COLUMN_WRAP.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Draws `lines` down from `cursor` at `x`, stopping at the body floor. When
/// lines are dropped the last one drawn ends in an ellipsis. Returns how
/// many lines were dropped.
fn draw_column(layout: &mut CertificateLayout, x: f32, lines: Vec<ColumnLine>, cursor: &mut Cursor) -> usize {
    let total = lines.len();
    let mut placed: Vec<(f32, ColumnLine)> = Vec::with_capacity(total);
    for line in lines {
        let mut next = *cursor;
        next.skip(line.gap);
        if next.y() < BODY_FLOOR {
            break;
        }
        let y = next.take(line.step);
        *cursor = next;
        placed.push((y, line));
    }

    let dropped = total - placed.len();
    if dropped > 0 {
        if let Some((_, last)) = placed.last_mut() {
            last.text = ellipsize(&last.text);
        }
        warn!(dropped, "Column truncated above the footer");
    }
    for (y, line) in placed {
        layout.text(x, y, line.size, line.font, line.text);
    }
    dropped
}

// ═══════════════════════════════════════════
// Header and footer (fixed)
// ═══════════════════════════════════════════

fn draw_header(layout: &mut CertificateLayout, today: NaiveDate) {
    layout.text(MARGIN, HEADER_Y, BODY_SIZE, Font::Bold, "ACORD");
    layout.text(DATE_X, HEADER_Y, BODY_SIZE, Font::Regular, "DATE (MM/DD/YYYY)");
    layout.text(centered_x(FORM_TITLE, TITLE_SIZE), TITLE_Y, TITLE_SIZE, Font::Bold, FORM_TITLE);
    layout.text(MARGIN, HEADER_SUB_Y, FINE_SIZE, Font::Regular, FORM_ID);
    layout.text(DATE_X, HEADER_SUB_Y, 10.0, Font::Bold, format_date(Some(today)));
    layout.rule(MARGIN, HEADER_RULE_Y, PAGE_WIDTH - MARGIN, HEADER_RULE_Y);
}

fn draw_footer(layout: &mut CertificateLayout) {
    let mut cursor = Cursor::at(DISCLAIMER_Y);
    for line in wrap_text(DISCLAIMER, FOOTER_WRAP) {
        layout.text(FOOTER_X, cursor.take(SMALL_LINE), FINE_SIZE, Font::Regular, line);
    }
    layout.text(FOOTER_X, COPYRIGHT_Y, FINE_SIZE, Font::Regular, "(C) 1988-2015 ACORD CORPORATION. All rights reserved.");
    layout.text(
        FOOTER_X,
        COPYRIGHT_Y - SMALL_LINE,
        FINE_SIZE,
        Font::Regular,
        "The ACORD name and logo are registered marks of ACORD",
    );
}

// ═══════════════════════════════════════════
// Producer / insured
// ═══════════════════════════════════════════

fn draw_parties(layout: &mut CertificateLayout, fields: &FieldMap, cursor: &mut Cursor) {
    let top = cursor.y();

    let mut left = *cursor;
    layout.text(LEFT_X, left.take(LINE + 2.0), LABEL_SIZE, Font::Regular, "PRODUCER");
    for (i, line) in field_lines(fields, "producer", MAX_PARTY_LINES).into_iter().enumerate() {
        let (size, font) = if i == 0 { (NAME_SIZE, Font::Bold) } else { (BODY_SIZE, Font::Regular) };
        layout.text(LEFT_X, left.take(LINE), size, font, line);
    }
    left.skip(4.0);
    layout.text(LEFT_X, left.take(LINE), BODY_SIZE, Font::Regular, format!("CONTACT: {PLACEHOLDER_CONTACT}"));
    layout.text(LEFT_X, left.take(LINE), BODY_SIZE, Font::Regular, format!("PHONE: {PLACEHOLDER_PHONE}"));

    let mut right = *cursor;
    layout.text(RIGHT_X, right.take(LINE + 2.0), LABEL_SIZE, Font::Regular, "INSURED");
    let named = fields.text("named_insured").unwrap_or(PLACEHOLDER_INSURED);
    layout.text(RIGHT_X, right.take(LINE), NAME_SIZE + 1.0, Font::Bold, named);
    for line in field_lines(fields, "insured_address", MAX_PARTY_LINES) {
        layout.text(RIGHT_X, right.take(LINE), BODY_SIZE, Font::Regular, line);
    }

    let bottom = left.lowest(right);
    let height = top + LINE - bottom.y();
    layout.outline(MARGIN, bottom.y(), COLUMN_WIDTH, height);
    layout.outline(RIGHT_X - BOX_PAD, bottom.y(), COLUMN_WIDTH, height);

    *cursor = bottom;
    cursor.skip(SECTION_GAP);
}

// ═══════════════════════════════════════════
// Insurers
// ═══════════════════════════════════════════

fn draw_insurers(layout: &mut CertificateLayout, fields: &FieldMap, cursor: &mut Cursor) {
    let top = cursor.y();
    let y = cursor.take(LINE + 2.0);
    layout.text(LEFT_X, y, LABEL_SIZE, Font::Regular, "INSURERS AFFORDING COVERAGE");
    layout.text(RIGHT_X, y, LABEL_SIZE, Font::Regular, "NAIC #");

    let insurers = fields
        .get("insurers")
        .map(InsurerMap::from_field_value)
        .unwrap_or_default();
    for (letter, name) in insurers.iter().take(MAX_INSURERS) {
        let y = cursor.take(LINE);
        layout.text(LEFT_X, y, BODY_SIZE, Font::Regular, format!("INSURER {letter}:"));
        layout.text(INSURER_NAME_X, y, BODY_SIZE, Font::Regular, name);
    }

    layout.outline(MARGIN, cursor.y(), PAGE_WIDTH - 2.0 * MARGIN, top + LINE - cursor.y());
    cursor.skip(SECTION_GAP);
}

// ═══════════════════════════════════════════
// Coverages
// ═══════════════════════════════════════════

/// Returns the number of coverage rows drawn.
fn draw_coverages(layout: &mut CertificateLayout, fields: &FieldMap, cursor: &mut Cursor) -> usize {
    let top = cursor.y();
    layout.text(LEFT_X, cursor.take(LINE + 2.0), LABEL_SIZE, Font::Bold, "COVERAGES");

    let y = cursor.take(SMALL_LINE);
    for (x, label) in [(LTR_X, "INSR"), (ADDL_X, "ADDL"), (SUBR_X, "SUBR"), (EFF_X, "POLICY EFF"), (EXP_X, "POLICY EXP")] {
        layout.text(x, y, FINE_SIZE, Font::Regular, label);
    }
    let y = cursor.take(LINE);
    for (x, label) in [
        (LTR_X, "LTR"),
        (TYPE_X, "TYPE OF INSURANCE"),
        (ADDL_X, "INSD"),
        (SUBR_X, "WVD"),
        (POLICY_X, "POLICY NUMBER"),
        (EFF_X, "(MM/DD/YYYY)"),
        (EXP_X, "(MM/DD/YYYY)"),
        (LIMIT_LABEL_X, "LIMITS"),
    ] {
        layout.text(x, y, FINE_SIZE, Font::Regular, label);
    }

    let additional_insured = fields.flag("additional_insured") == Some(true);
    let waiver = fields.flag("waiver_of_subrogation") == Some(true);

    let mut rows = 0;
    for kind in ROW_ORDER {
        if !row_drawn(fields, kind) {
            continue;
        }
        let coverage = Coverage::build(kind, fields);
        let block = coverage.block();

        let y = cursor.take(LINE);
        if let Some(letter) = block.insurer_letter() {
            layout.text(LTR_X, y, BODY_SIZE, Font::Regular, letter.to_string());
        }
        layout.text(TYPE_X, y, LABEL_SIZE, Font::Bold, row_label(kind));
        if additional_insured && kind != CoverageKind::WorkersComp {
            layout.text(ADDL_X, y, LABEL_SIZE, Font::Regular, "Y");
        }
        if waiver {
            layout.text(SUBR_X, y, LABEL_SIZE, Font::Regular, "Y");
        }
        layout.text(POLICY_X, y, LABEL_SIZE, Font::Regular, block.policy_number().unwrap_or(PLACEHOLDER_POLICY));
        layout.text(EFF_X, y, LABEL_SIZE, Font::Regular, format_date(block.effective_date()));
        layout.text(EXP_X, y, LABEL_SIZE, Font::Regular, format_date(block.expiration_date()));

        // First limit shares the row baseline; the rest stack below it.
        // Workers comp limits are statutory, so the mark takes the baseline.
        let mut limit_y = Some(y);
        if kind == CoverageKind::WorkersComp {
            layout.text(LIMIT_LABEL_X, y, LABEL_SIZE, Font::Bold, "X");
            layout.text(LIMIT_LABEL_X + STATUTE_OFFSET, y, FINE_SIZE, Font::Regular, PER_STATUTE);
            limit_y = None;
        }
        for (limit, amount) in block.limits() {
            let Some(amount) = amount else {
                continue;
            };
            let y = limit_y.take().unwrap_or_else(|| cursor.take(LINE));
            layout.text(LIMIT_LABEL_X, y, FINE_SIZE, Font::Regular, limit.label);
            layout.text(LIMIT_VALUE_X, y, LABEL_SIZE, Font::Regular, format_usd(amount));
        }
        cursor.skip(4.0);
        rows += 1;
    }

    layout.outline(MARGIN, cursor.y(), PAGE_WIDTH - 2.0 * MARGIN, top + LINE - cursor.y());
    cursor.skip(SECTION_GAP);
    rows
}

fn draw_endorsement_boxes(layout: &mut CertificateLayout, fields: &FieldMap, cursor: &mut Cursor) {
    let mut drawn = false;
    for (field, label) in ENDORSEMENT_BOXES {
        if fields.flag(field) == Some(true) {
            layout.text(LEFT_X, cursor.take(LINE), LABEL_SIZE, Font::Regular, format!("[X] {label}"));
            drawn = true;
        }
    }
    if drawn {
        cursor.skip(SECTION_GAP - LINE / 2.0);
    }
}

// ═══════════════════════════════════════════
// Certificate holder / description of operations
// ═══════════════════════════════════════════

fn draw_holder_and_description(layout: &mut CertificateLayout, fields: &FieldMap, cursor: &mut Cursor) {
    let top = cursor.y();

    let mut left_lines = vec![ColumnLine::new(LABEL_SIZE, Font::Bold, "CERTIFICATE HOLDER").step(LINE + 2.0)];
    let mut holder = field_lines(fields, "certificate_holder", MAX_PARTY_LINES);
    if holder.is_empty() {
        holder.push(PLACEHOLDER_HOLDER.to_string());
    }
    for (i, line) in holder.into_iter().enumerate() {
        let (size, font) = if i == 0 { (NAME_SIZE, Font::Bold) } else { (BODY_SIZE, Font::Regular) };
        left_lines.push(ColumnLine::new(size, font, line));
    }
    left_lines.push(ColumnLine::new(LABEL_SIZE, Font::Bold, "CANCELLATION").gap(4.0));
    for line in wrap_text(CANCELLATION, COLUMN_WRAP) {
        left_lines.push(ColumnLine::new(FINE_SIZE, Font::Regular, line).step(SMALL_LINE));
    }
    left_lines.push(ColumnLine::new(FINE_SIZE, Font::Regular, "AUTHORIZED REPRESENTATIVE").gap(4.0));
    let mut left = *cursor;
    draw_column(layout, LEFT_X, left_lines, &mut left);

    let mut right_lines = vec![ColumnLine::new(
        LABEL_SIZE,
        Font::Bold,
        "DESCRIPTION OF OPERATIONS / LOCATIONS / VEHICLES",
    )
    .step(LINE + 2.0)];
    let description = fields
        .text("description_of_operations")
        .map(|d| d.lines().flat_map(|l| wrap_text(l, COLUMN_WRAP)).collect::<Vec<_>>())
        .unwrap_or_default();
    let shown = description.len().min(MAX_DESCRIPTION_LINES);
    for (i, line) in description.iter().take(shown).enumerate() {
        let line = if i + 1 == shown && description.len() > shown { ellipsize(line) } else { line.clone() };
        right_lines.push(ColumnLine::new(LABEL_SIZE, Font::Regular, line));
    }
    if let Some(name) = fields.text(PROJECT_NAME) {
        right_lines.push(ColumnLine::new(BODY_SIZE, Font::Regular, format!("RE: {name}")));
    }
    if let Some(address) = fields.text(PROJECT_ADDRESS) {
        right_lines.push(ColumnLine::new(BODY_SIZE, Font::Regular, address));
    }
    if let Some(names) = fields.list("additional_insureds").filter(|n| !n.is_empty()) {
        right_lines.push(ColumnLine::new(LABEL_SIZE, Font::Bold, "ADDITIONAL INSUREDS:").gap(4.0));
        for name in names.iter().take(MAX_ADDITIONAL_INSUREDS) {
            right_lines.push(ColumnLine::new(BODY_SIZE, Font::Regular, name.as_str()));
        }
        if names.len() > MAX_ADDITIONAL_INSUREDS {
            warn!(listed = names.len(), shown = MAX_ADDITIONAL_INSUREDS, "Additional insureds truncated");
        }
    }
    let mut right = *cursor;
    draw_column(layout, RIGHT_X, right_lines, &mut right);

    let bottom = left.lowest(right);
    let height = top + LINE - bottom.y();
    layout.outline(MARGIN, bottom.y(), COLUMN_WIDTH, height);
    layout.outline(RIGHT_X - BOX_PAD, bottom.y(), COLUMN_WIDTH, height);
    *cursor = bottom;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldValue, ProjectContext};
    use crate::pipeline::extraction::{extract_fields, FieldSchema};

    fn make_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn make_insurers() -> FieldValue {
        let mut map = InsurerMap::default();
        map.insert('A', "National Liability Insurance Co.");
        map.insert('B', "State Workers Compensation Fund");
        map.insert('C', "Excess Carrier Co.");
        map.to_field_value()
    }

    fn make_fields() -> FieldMap {
        let mut f = FieldMap::new();
        f.insert("producer", "XYZ Brokers\n1 Broker Way\nNew York, NY 10005");
        f.insert("named_insured", "ABC Plumbing Corp");
        f.insert("insured_address", "456 Pipe Street\nBrooklyn, NY 11201");
        f.insert("insurers", make_insurers());
        f.insert("gl_insurer_letter", "A");
        f.insert("gl_policy_number", "GL-2024-001234");
        f.insert("gl_effective_date", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        f.insert("gl_expiration_date", NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
        f.insert("gl_each_occurrence", 1_000_000.0);
        f.insert("gl_damage_to_rented_premises", 100_000.0);
        f.insert("gl_med_exp", 5_000.0);
        f.insert("gl_personal_adv_injury", 1_000_000.0);
        f.insert("gl_general_aggregate", 2_000_000.0);
        f.insert("gl_products_completed_ops", 2_000_000.0);
        f.insert("wc_insurer_letter", "B");
        f.insert("wc_policy_number", "WC-998877");
        f.insert("wc_el_each_accident", 1_000_000.0);
        f.insert("wc_el_disease_each_employee", 1_000_000.0);
        f.insert("wc_el_disease_policy_limit", 1_000_000.0);
        f
    }

    fn make_project() -> ProjectContext {
        ProjectContext {
            project_name: Some("Hudson Yards Tower B".into()),
            gc_name: Some("Main Street Contractors".into()),
            gc_address: Some("1 Main St, New York, NY 10001".into()),
            ..Default::default()
        }
    }

    fn reuse_text(fields: &FieldMap) -> String {
        let project = make_project();
        layout_certificate_at(fields, &RenderMode::Reuse { project: &project }, make_today()).to_text()
    }

    #[test]
    fn workers_comp_row_always_present() {
        let text = reuse_text(&FieldMap::new());
        assert!(text.contains("WORKERS COMPENSATION"));
        assert!(text.contains("COMMERCIAL GENERAL LIABILITY"));
        assert!(!text.contains("AUTOMOBILE LIABILITY"));
        assert!(text.contains(PLACEHOLDER_POLICY));
    }

    #[test]
    fn umbrella_row_only_with_umbrella_data() {
        let fields = make_fields();
        assert!(!reuse_text(&fields).contains("UMBRELLA LIAB"));

        let mut with_umbrella = fields;
        with_umbrella.insert("umbrella_each_occurrence", 5_000_000.0);
        assert!(reuse_text(&with_umbrella).contains("UMBRELLA LIAB"));
    }

    #[test]
    fn coverage_row_reads_left_to_right() {
        let text = reuse_text(&make_fields());
        assert!(text.contains(
            "A COMMERCIAL GENERAL LIABILITY GL-2024-001234 01/01/2026 01/01/2027 EACH OCCURRENCE $1,000,000"
        ));
        assert!(text.contains(
            "B WORKERS COMPENSATION WC-998877 MM/DD/YYYY MM/DD/YYYY X PER STATUTE\nE.L. EACH ACCIDENT $1,000,000"
        ));
        assert!(text.contains("INSURER A: National Liability Insurance Co."));
        assert!(text.contains("ACORD 25 (2016/03) 03/01/2026"));
    }

    #[test]
    fn round_trip_recovers_policy_terms_and_limits() {
        let mut fields = make_fields();
        fields.insert("umbrella_insurer_letter", "C");
        fields.insert("umbrella_policy_number", "UMB-334455");
        fields.insert("umbrella_each_occurrence", 5_000_000.0);
        fields.insert("umbrella_aggregate", 4_000_000.0);
        fields.insert("auto_policy_number", "AU-556677");
        fields.insert("auto_combined_single_limit", 1_000_000.0);

        let text = reuse_text(&fields);
        let extracted = extract_fields(&text, &FieldSchema::certificate());

        assert_eq!(extracted.text("gl_policy_number"), Some("GL-2024-001234"));
        assert_eq!(extracted.text("umbrella_policy_number"), Some("UMB-334455"));
        assert_eq!(extracted.text("auto_policy_number"), Some("AU-556677"));
        assert_eq!(extracted.text("wc_policy_number"), Some("WC-998877"));
        for field in [
            "gl_each_occurrence",
            "gl_damage_to_rented_premises",
            "gl_med_exp",
            "gl_personal_adv_injury",
            "gl_general_aggregate",
            "gl_products_completed_ops",
            "auto_combined_single_limit",
            "umbrella_each_occurrence",
            "umbrella_aggregate",
            "wc_el_each_accident",
            "wc_el_disease_each_employee",
            "wc_el_disease_policy_limit",
        ] {
            assert_eq!(extracted.number(field), fields.number(field), "{field}");
        }
        assert_eq!(extracted.date("gl_expiration_date"), fields.date("gl_expiration_date"));
        assert_eq!(extracted.text("gl_insurer"), Some("National Liability Insurance Co."));
        assert_eq!(extracted.text("umbrella_insurer_letter"), Some("C"));
        assert_eq!(extracted.text("named_insured"), Some("ABC Plumbing Corp"));
        assert_eq!(extracted.date("certificate_date"), Some(make_today()));
        assert_eq!(
            extracted.text("certificate_holder"),
            Some("Main Street Contractors\n1 Main St, New York, NY 10001")
        );
    }

    #[test]
    fn disclaimer_does_not_assert_endorsements() {
        let text = reuse_text(&make_fields());
        let extracted = extract_fields(&text, &FieldSchema::certificate());
        assert_eq!(extracted.flag("waiver_of_subrogation"), None);
        assert_eq!(extracted.flag("additional_insured"), None);
    }

    #[test]
    fn checked_endorsements_survive_round_trip() {
        let mut fields = make_fields();
        fields.insert("additional_insured", true);
        fields.insert("waiver_of_subrogation", true);
        let text = reuse_text(&fields);
        assert!(text.contains("[X] Waiver of Subrogation"));
        let extracted = extract_fields(&text, &FieldSchema::certificate());
        assert_eq!(extracted.flag("additional_insured"), Some(true));
        assert_eq!(extracted.flag("waiver_of_subrogation"), Some(true));
        assert_eq!(extracted.flag("primary_non_contributory"), None);
    }

    #[test]
    fn workers_comp_row_marks_per_statute() {
        let text = reuse_text(&FieldMap::new());
        let wc_row = text.lines().find(|l| l.contains("WORKERS COMPENSATION")).unwrap();
        assert!(wc_row.ends_with("X PER STATUTE"));
        assert_eq!(text.matches(PER_STATUTE).count(), 1);

        let extracted = extract_fields(&reuse_text(&make_fields()), &FieldSchema::certificate());
        assert_eq!(extracted.text("wc_policy_number"), Some("WC-998877"));
        assert_eq!(extracted.number("wc_el_each_accident"), Some(1_000_000.0));
    }

    #[test]
    fn overflowing_column_is_ellipsized_above_footer() {
        let mut layout = CertificateLayout::new("t");
        let mut cursor = Cursor::at(BODY_FLOOR + 2.0 * LINE);
        let lines = (0..6)
            .map(|i| ColumnLine::new(BODY_SIZE, Font::Regular, format!("Owner {i} LLC")))
            .collect();

        let dropped = draw_column(&mut layout, RIGHT_X, lines, &mut cursor);
        assert_eq!(dropped, 3);
        assert_eq!(layout.to_text(), "Owner 0 LLC\nOwner 1 LLC\nOwner 2 LLC...");
        assert!(layout.lowest_baseline().is_some_and(|y| y >= BODY_FLOOR));
    }

    #[test]
    fn maximal_body_stays_above_footer() {
        let mut fields = make_fields();
        fields.insert("umbrella_each_occurrence", 5_000_000.0);
        fields.insert("umbrella_aggregate", 5_000_000.0);
        fields.insert("auto_combined_single_limit", 1_000_000.0);
        fields.insert("auto_bodily_injury_per_person", 1_000_000.0);
        fields.insert("auto_bodily_injury_per_accident", 1_000_000.0);
        fields.insert("auto_property_damage", 1_000_000.0);
        fields.insert("additional_insured", true);
        fields.insert("waiver_of_subrogation", true);
        fields.insert("primary_non_contributory", true);
        fields.insert("producer", (0..9).map(|i| format!("Broker line {i}")).collect::<Vec<_>>().join("\n"));
        fields.insert("description_of_operations", "Scope of work ".repeat(80));
        let mut insurers = InsurerMap::default();
        for letter in ['A', 'B', 'C', 'D', 'E', 'F'] {
            insurers.insert(letter, format!("Carrier {letter} Insurance Company"));
        }
        fields.insert("insurers", insurers.to_field_value());
        let project = ProjectContext {
            project_address: Some("500 W 33rd St, New York, NY 10001".into()),
            additional_insureds: (0..25).map(|i| format!("Owner {i} LLC")).collect(),
            ..make_project()
        };

        let layout = layout_certificate_at(&fields, &RenderMode::Reuse { project: &project }, make_today());
        let mut footer = CertificateLayout::new("t");
        draw_footer(&mut footer);
        let below_floor = layout.runs().iter().filter(|r| r.y < BODY_FLOOR).count();
        assert_eq!(below_floor, footer.runs().len());

        let text = layout.to_text();
        assert!(text.contains("Owner 3 LLC"));
        assert!(!text.contains("Owner 4 LLC"));
        assert_eq!(text.lines().filter(|l| l.ends_with("...")).count(), 1);
    }

    #[test]
    fn full_form_fits_one_page() {
        let mut fields = make_fields();
        fields.insert("umbrella_each_occurrence", 5_000_000.0);
        fields.insert("umbrella_aggregate", 5_000_000.0);
        fields.insert("auto_combined_single_limit", 1_000_000.0);
        fields.insert("auto_bodily_injury_per_person", 1_000_000.0);
        fields.insert("auto_bodily_injury_per_accident", 1_000_000.0);
        fields.insert("auto_property_damage", 1_000_000.0);
        fields.insert("additional_insured", true);
        fields.insert("waiver_of_subrogation", true);
        fields.insert("primary_non_contributory", true);
        fields.insert("description_of_operations", "x ".repeat(400));
        let project = ProjectContext {
            additional_insureds: (0..10).map(|i| format!("Owner {i} LLC")).collect(),
            ..make_project()
        };
        let layout = layout_certificate_at(&fields, &RenderMode::Reuse { project: &project }, make_today());
        assert!(layout.fits_page());
        assert!(layout.lowest_baseline().is_some_and(|y| y >= MARGIN));
    }
}
