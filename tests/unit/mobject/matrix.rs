use super::*;

#[test]
fn entries_are_laid_out_row_major() {
    let entries = (0..6).map(|_| Mobject::square(0.2)).collect();
    let m = matrix_layout(entries, 2, 3);
    assert_eq!(m.children.len(), 3);
    let grid = &m.children[0];
    let c0 = grid.children[0].center();
    let c1 = grid.children[1].center();
    let c3 = grid.children[3].center();
    assert!((c1.x - c0.x - MATRIX_H_BUFF).abs() < 1e-12);
    assert!((c0.y - c3.y - MATRIX_V_BUFF).abs() < 1e-12);
    // Brackets enclose the grid.
    let gb = grid.bounds().unwrap();
    assert!(m.children[1].bounds().unwrap().max.x < gb.min.x);
    assert!(m.children[2].bounds().unwrap().min.x > gb.max.x);
}
