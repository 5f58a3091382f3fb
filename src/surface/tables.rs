//! Marching cubes case table, generated once instead of transcribed.
//!
//! Corner `i` of a cell sits at offset `(i & 1, (i >> 1) & 1, (i >> 2) & 1)`.
//! For every inside/outside configuration the iso-contour is traced across
//! the six faces: walking each face counter-clockwise (seen from outside),
//! a segment runs from an edge where the walk enters the inside region to
//! the next edge where it leaves. Segments chain into closed loops which are
//! fanned into triangles. Ambiguous faces always separate inside corners, so
//! neighbouring cells agree on the shared face and the surface is watertight.
//! Resulting triangles wind counter-clockwise seen from the outside region.
use smallvec::SmallVec;
use std::sync::LazyLock;

/// Cell edges as `(low corner, high corner)`; the corners differ in exactly one bit.
pub const EDGES: [(u8, u8); 12] = [
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Face corner cycles, counter-clockwise seen from outside the cell.
const FACES: [[u8; 4]; 6] = [
    [0, 2, 3, 1], // z = 0
    [4, 5, 7, 6], // z = 1
    [0, 1, 5, 4], // y = 0
    [2, 6, 7, 3], // y = 1
    [0, 4, 6, 2], // x = 0
    [1, 3, 7, 5], // x = 1
];

pub type CaseTriangles = SmallVec<[[u8; 3]; 8]>;

pub struct CaseTable {
    cases: Vec<CaseTriangles>,
}

pub static CASES: LazyLock<CaseTable> = LazyLock::new(CaseTable::generate);

impl CaseTable {
    /// Triangles (as edge indices) for a corner mask; bit `i` set = corner `i` inside.
    #[inline]
    pub fn triangles(&self, mask: u8) -> &[[u8; 3]] {
        &self.cases[mask as usize]
    }

    fn generate() -> Self {
        Self {
            cases: (0..=255u8).map(triangulate_case).collect(),
        }
    }
}

/// Offset of `corner` inside the cell.
#[inline]
pub fn corner_offset(corner: u8) -> (usize, usize, usize) {
    (
        (corner & 1) as usize,
        ((corner >> 1) & 1) as usize,
        ((corner >> 2) & 1) as usize,
    )
}

/// Axis (0 = x, 1 = y, 2 = z) an edge runs along.
#[inline]
pub fn edge_axis(edge: u8) -> usize {
    let (a, b) = EDGES[edge as usize];
    (a ^ b).trailing_zeros() as usize
}

fn edge_between(a: u8, b: u8) -> u8 {
    let key = (a.min(b), a.max(b));
    EDGES
        .iter()
        .position(|e| *e == key)
        .map(|i| i as u8)
        .unwrap_or_else(|| unreachable!("corners {a} and {b} are not adjacent"))
}

fn triangulate_case(mask: u8) -> CaseTriangles {
    let inside = |c: u8| mask & (1 << c) != 0;

    // next[e] = edge where the contour leaves the face entered through e.
    let mut next: [Option<u8>; 12] = [None; 12];
    for face in FACES {
        let mut crossings: SmallVec<[(u8, bool); 4]> = SmallVec::new();
        for k in 0..4 {
            let (p, q) = (face[k], face[(k + 1) % 4]);
            if inside(p) != inside(q) {
                crossings.push((edge_between(p, q), inside(q)));
            }
        }
        let len = crossings.len();
        for (i, &(edge, entering)) in crossings.iter().enumerate() {
            if entering {
                next[edge as usize] = Some(crossings[(i + 1) % len].0);
            }
        }
    }

    let mut triangles = CaseTriangles::new();
    let mut visited = [false; 12];
    for start in 0..12u8 {
        if visited[start as usize] || next[start as usize].is_none() {
            continue;
        }
        let mut contour: SmallVec<[u8; 16]> = SmallVec::new();
        let mut edge = start;
        while !visited[edge as usize] {
            visited[edge as usize] = true;
            contour.push(edge);
            match next[edge as usize] {
                Some(n) => edge = n,
                None => break,
            }
        }
        for i in 1..contour.len().saturating_sub(1) {
            triangles.push([contour[0], contour[i], contour[i + 1]]);
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn crossed_edges(mask: u8) -> BTreeSet<u8> {
        (0..12u8)
            .filter(|&e| {
                let (a, b) = EDGES[e as usize];
                (mask >> a) & 1 != (mask >> b) & 1
            })
            .collect()
    }

    #[test]
    fn uniform_cases_are_empty() {
        assert!(CASES.triangles(0).is_empty());
        assert!(CASES.triangles(255).is_empty());
    }

    #[test]
    fn single_corner_is_one_triangle() {
        for corner in 0..8 {
            let tris = CASES.triangles(1 << corner);
            assert_eq!(tris.len(), 1, "corner {corner}");
            let mut got: Vec<u8> = tris[0].to_vec();
            got.sort_unstable();
            let expected: Vec<u8> = crossed_edges(1 << corner).into_iter().collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn every_crossed_edge_carries_a_vertex() {
        for mask in 0..=255u8 {
            let used: BTreeSet<u8> = CASES.triangles(mask).iter().flatten().copied().collect();
            assert_eq!(used, crossed_edges(mask), "mask {mask:#010b}");
        }
    }

    #[test]
    fn triangle_count_matches_contour_sizes() {
        // A contour of k edges fans into k - 2 triangles, and every contour has k >= 3.
        for mask in 0..=255u8 {
            let edges = crossed_edges(mask).len();
            let tris = CASES.triangles(mask).len();
            assert!(tris + 2 <= edges.max(2), "mask {mask:#010b}");
            if edges > 0 {
                assert!(tris >= edges / 3, "mask {mask:#010b}");
            }
        }
    }

    #[test]
    fn single_corner_winds_away_from_inside() {
        // Corner 0 inside: vertices on edges x (0,1), y (0,2), z (0,4) at midpoints.
        let mid = |e: u8| {
            let (a, b) = EDGES[e as usize];
            let (ax, ay, az) = corner_offset(a);
            let (bx, by, bz) = corner_offset(b);
            [
                (ax + bx) as f32 * 0.5,
                (ay + by) as f32 * 0.5,
                (az + bz) as f32 * 0.5,
            ]
        };
        let [a, b, c] = CASES.triangles(1)[0].map(mid);
        let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        let n = [
            u[1] * v[2] - u[2] * v[1],
            u[2] * v[0] - u[0] * v[2],
            u[0] * v[1] - u[1] * v[0],
        ];
        assert!(n[0] > 0.0 && n[1] > 0.0 && n[2] > 0.0, "normal {n:?}");
    }

    #[test]
    fn edge_axes_match_corner_bits() {
        assert_eq!(edge_axis(0), 0);
        assert_eq!(edge_axis(4), 1);
        assert_eq!(edge_axis(8), 2);
        assert_eq!(edge_axis(11), 2);
    }
}
