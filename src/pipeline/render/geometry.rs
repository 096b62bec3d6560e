//! Page geometry, in PDF points (1/72 inch), origin bottom-left.
//!
//! Label placement is stable across releases: rendered certificates are
//! re-parsed by the extraction engine.

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 30.0;

// Header (fixed).
pub const HEADER_Y: f32 = PAGE_HEIGHT - 30.0;
pub const TITLE_Y: f32 = PAGE_HEIGHT - 35.0;
pub const HEADER_SUB_Y: f32 = PAGE_HEIGHT - 45.0;
pub const HEADER_RULE_Y: f32 = PAGE_HEIGHT - 55.0;
pub const DATE_X: f32 = PAGE_WIDTH - 150.0;

// Body starts here; everything below follows the running cursor.
pub const BODY_TOP: f32 = 700.0;
pub const LEFT_X: f32 = 35.0;
pub const RIGHT_X: f32 = 320.0;
pub const COLUMN_WIDTH: f32 = 280.0;
pub const INSURER_NAME_X: f32 = 90.0;

// Coverage row columns.
pub const LTR_X: f32 = 35.0;
pub const TYPE_X: f32 = 48.0;
pub const ADDL_X: f32 = 168.0;
pub const SUBR_X: f32 = 186.0;
pub const POLICY_X: f32 = 206.0;
pub const EFF_X: f32 = 290.0;
pub const EXP_X: f32 = 340.0;
pub const LIMIT_LABEL_X: f32 = 392.0;
pub const LIMIT_VALUE_X: f32 = 522.0;

// Vertical rhythm.
pub const LINE: f32 = 10.0;
pub const SMALL_LINE: f32 = 8.0;
pub const SECTION_GAP: f32 = 12.0;
pub const BOX_PAD: f32 = 5.0;

// Footer (fixed).
pub const DISCLAIMER_Y: f32 = 90.0;
pub const FOOTER_X: f32 = 40.0;
pub const COPYRIGHT_Y: f32 = 40.0;

/// Lowest baseline the body may use; the footer owns everything below.
pub const BODY_FLOOR: f32 = DISCLAIMER_Y + LINE;

// Font sizes.
pub const TITLE_SIZE: f32 = 16.0;
pub const NAME_SIZE: f32 = 9.0;
pub const BODY_SIZE: f32 = 8.0;
pub const LABEL_SIZE: f32 = 7.0;
pub const FINE_SIZE: f32 = 6.0;

// Wrap widths, in characters.
pub const COLUMN_WRAP: usize = 62;
pub const FOOTER_WRAP: usize = 140;

// Line caps that keep the form on one page.
pub const MAX_PARTY_LINES: usize = 5;
pub const MAX_INSURERS: usize = 6;
pub const MAX_DESCRIPTION_LINES: usize = 4;
pub const MAX_ADDITIONAL_INSUREDS: usize = 4;

/// Points to millimetres, for `printpdf`.
pub fn pt_to_mm(pt: f32) -> f32 {
    pt * 25.4 / 72.0
}
