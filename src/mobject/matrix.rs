use crate::foundation::math::Vec3;
use crate::mobject::builder::Mobject;

pub const MATRIX_H_BUFF: f64 = 1.3;
pub const MATRIX_V_BUFF: f64 = 0.8;

/// Lays out `entries` (row-major, `rows x cols`) on a grid and adds square brackets.
///
/// The result is `[entries_group, left_bracket, right_bracket]`; entry `k` is child `k` of the
/// entries group.
pub fn matrix_layout(entries: Vec<Mobject>, rows: usize, cols: usize) -> Mobject {
    let (w, h) = (
        MATRIX_H_BUFF * cols.saturating_sub(1) as f64,
        MATRIX_V_BUFF * rows.saturating_sub(1) as f64,
    );
    let placed = entries.into_iter().enumerate().map(|(k, e)| {
        let (r, c) = (k / cols.max(1), k % cols.max(1));
        let at = Vec3::xy(-w / 2.0 + c as f64 * MATRIX_H_BUFF, h / 2.0 - r as f64 * MATRIX_V_BUFF);
        e.moved_to(at)
    });
    let grid = Mobject::group(placed).named("entries");

    let bounds = grid.bounds();
    let (lo, hi) = bounds
        .map(|b| (b.min, b.max))
        .unwrap_or((Vec3::ZERO, Vec3::ZERO));
    let pad = 0.15;
    let (top, bottom) = (hi.y + pad, lo.y - pad);
    let arm = 0.1;
    let left_x = lo.x - pad;
    let right_x = hi.x + pad;
    let left = Mobject::polyline(&[
        Vec3::xy(left_x + arm, top),
        Vec3::xy(left_x, top),
        Vec3::xy(left_x, bottom),
        Vec3::xy(left_x + arm, bottom),
    ])
    .with_stroke_width(3.0)
    .named("left_bracket");
    let right = Mobject::polyline(&[
        Vec3::xy(right_x - arm, top),
        Vec3::xy(right_x, top),
        Vec3::xy(right_x, bottom),
        Vec3::xy(right_x - arm, bottom),
    ])
    .with_stroke_width(3.0)
    .named("right_bracket");

    Mobject::group([grid, left, right]).named("matrix")
}

#[cfg(test)]
#[path = "../../tests/unit/mobject/matrix.rs"]
mod tests;
