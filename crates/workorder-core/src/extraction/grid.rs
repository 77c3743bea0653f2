use super::{BBox, Ruling, TableGrid};
use crate::config::GridOptions;
use std::collections::{BTreeMap, HashMap};

/// Lattice-style table detection from ruling lines.
///
/// Rulings are snapped and joined into edges, edge crossings become
/// intersection points, and every point that closes a rectangle with its
/// nearest connected neighbours to the right and below yields a cell.
/// Cells sharing a corner belong to the same table.
pub fn find_table_grids(rulings: &[Ruling], options: &GridOptions) -> Vec<TableGrid> {
    let (horizontal, vertical) = split_edges(rulings);

    let horizontal: Vec<HEdge> = join_horizontal(
        snap_horizontal(horizontal, options.snap_tolerance),
        options.join_tolerance,
    )
    .into_iter()
    .filter(|e| e.x1 - e.x0 >= options.min_edge_length)
    .collect();
    let vertical: Vec<VEdge> = join_vertical(
        snap_vertical(vertical, options.snap_tolerance),
        options.join_tolerance,
    )
    .into_iter()
    .filter(|e| e.y1 - e.y0 >= options.min_edge_length)
    .collect();

    if horizontal.is_empty() || vertical.is_empty() {
        return Vec::new();
    }

    let points = intersections(&horizontal, &vertical, options.intersection_tolerance);
    let cells = build_cells(&points);
    group_cells(cells)
}

#[derive(Debug, Clone, Copy)]
struct HEdge {
    y: f32,
    x0: f32,
    x1: f32,
}

#[derive(Debug, Clone, Copy)]
struct VEdge {
    x: f32,
    y0: f32,
    y1: f32,
}

fn split_edges(rulings: &[Ruling]) -> (Vec<HEdge>, Vec<VEdge>) {
    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();
    for ruling in rulings {
        match *ruling {
            Ruling::Horizontal { y, x0, x1 } => horizontal.push(HEdge {
                y,
                x0: x0.min(x1),
                x1: x0.max(x1),
            }),
            Ruling::Vertical { x, y0, y1 } => vertical.push(VEdge {
                x,
                y0: y0.min(y1),
                y1: y0.max(y1),
            }),
        }
    }
    (horizontal, vertical)
}

/// Cluster values lying within `tolerance` of the running cluster mean and
/// return the mean of each value's cluster, index-aligned with the input.
fn snap_positions(values: &[f32], tolerance: f32) -> Vec<f32> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut snapped = vec![0.0; values.len()];
    let mut cluster: Vec<usize> = Vec::new();
    let mut sum = 0.0f32;

    let mut flush = |cluster: &mut Vec<usize>, sum: &mut f32| {
        if !cluster.is_empty() {
            let mean = *sum / cluster.len() as f32;
            for &i in cluster.iter() {
                snapped[i] = mean;
            }
        }
        cluster.clear();
        *sum = 0.0;
    };

    for i in order {
        if !cluster.is_empty() {
            let mean = sum / cluster.len() as f32;
            if (values[i] - mean).abs() > tolerance {
                flush(&mut cluster, &mut sum);
            }
        }
        cluster.push(i);
        sum += values[i];
    }
    flush(&mut cluster, &mut sum);

    snapped
}

fn snap_horizontal(mut edges: Vec<HEdge>, tolerance: f32) -> Vec<HEdge> {
    let ys: Vec<f32> = edges.iter().map(|e| e.y).collect();
    for (edge, y) in edges.iter_mut().zip(snap_positions(&ys, tolerance)) {
        edge.y = y;
    }
    edges
}

fn snap_vertical(mut edges: Vec<VEdge>, tolerance: f32) -> Vec<VEdge> {
    let xs: Vec<f32> = edges.iter().map(|e| e.x).collect();
    for (edge, x) in edges.iter_mut().zip(snap_positions(&xs, tolerance)) {
        edge.x = x;
    }
    edges
}

fn join_horizontal(mut edges: Vec<HEdge>, tolerance: f32) -> Vec<HEdge> {
    edges.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x0.total_cmp(&b.x0)));
    let mut joined: Vec<HEdge> = Vec::new();
    for edge in edges {
        match joined.last_mut() {
            Some(last) if last.y == edge.y && edge.x0 <= last.x1 + tolerance => {
                last.x1 = last.x1.max(edge.x1);
            }
            _ => joined.push(edge),
        }
    }
    joined
}

fn join_vertical(mut edges: Vec<VEdge>, tolerance: f32) -> Vec<VEdge> {
    edges.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y0.total_cmp(&b.y0)));
    let mut joined: Vec<VEdge> = Vec::new();
    for edge in edges {
        match joined.last_mut() {
            Some(last) if last.x == edge.x && edge.y0 <= last.y1 + tolerance => {
                last.y1 = last.y1.max(edge.y1);
            }
            _ => joined.push(edge),
        }
    }
    joined
}

type PointKey = (i64, i64);

fn quantize(v: f32) -> i64 {
    (v * 100.0).round() as i64
}

#[derive(Debug, Clone)]
struct Intersection {
    x: f32,
    y: f32,
    horizontal: Vec<usize>,
    vertical: Vec<usize>,
}

/// Intersection points keyed by (y, x) so iteration runs top-to-bottom,
/// left-to-right.
fn intersections(
    horizontal: &[HEdge],
    vertical: &[VEdge],
    tolerance: f32,
) -> BTreeMap<PointKey, Intersection> {
    let mut points: BTreeMap<PointKey, Intersection> = BTreeMap::new();

    for (vi, v) in vertical.iter().enumerate() {
        for (hi, h) in horizontal.iter().enumerate() {
            let crosses = v.x >= h.x0 - tolerance
                && v.x <= h.x1 + tolerance
                && h.y >= v.y0 - tolerance
                && h.y <= v.y1 + tolerance;
            if !crosses {
                continue;
            }
            let point = points
                .entry((quantize(h.y), quantize(v.x)))
                .or_insert_with(|| Intersection {
                    x: v.x,
                    y: h.y,
                    horizontal: Vec::new(),
                    vertical: Vec::new(),
                });
            point.horizontal.push(hi);
            point.vertical.push(vi);
        }
    }

    points
}

fn shares_edge(a: &[usize], b: &[usize]) -> bool {
    a.iter().any(|e| b.contains(e))
}

fn build_cells(points: &BTreeMap<PointKey, Intersection>) -> Vec<BBox> {
    // Points in each column (same x) ordered by y, and in each row (same y)
    // ordered by x. BTreeMap iteration order keeps both sorted.
    let mut columns: HashMap<i64, Vec<PointKey>> = HashMap::new();
    let mut rows: HashMap<i64, Vec<PointKey>> = HashMap::new();
    for &key in points.keys() {
        rows.entry(key.0).or_default().push(key);
        columns.entry(key.1).or_default().push(key);
    }

    let mut cells = Vec::new();

    for (&key, point) in points {
        let below = columns
            .get(&key.1)
            .map(|c| c.iter().filter(|k| k.0 > key.0).copied().collect::<Vec<_>>())
            .unwrap_or_default();
        let right = rows
            .get(&key.0)
            .map(|r| r.iter().filter(|k| k.1 > key.1).copied().collect::<Vec<_>>())
            .unwrap_or_default();

        'search: for below_key in &below {
            let below_pt = &points[below_key];
            if !shares_edge(&point.vertical, &below_pt.vertical) {
                continue;
            }
            for right_key in &right {
                let right_pt = &points[right_key];
                if !shares_edge(&point.horizontal, &right_pt.horizontal) {
                    continue;
                }
                let Some(corner) = points.get(&(below_key.0, right_key.1)) else {
                    continue;
                };
                if shares_edge(&corner.vertical, &right_pt.vertical)
                    && shares_edge(&corner.horizontal, &below_pt.horizontal)
                {
                    cells.push(BBox::new(point.x, point.y, corner.x, corner.y));
                    break 'search;
                }
            }
        }
    }

    cells
}

fn find_root(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Group cells that share a corner into tables, dropping single-cell tables.
fn group_cells(cells: Vec<BBox>) -> Vec<TableGrid> {
    let mut parent: Vec<usize> = (0..cells.len()).collect();
    let mut corner_owner: HashMap<PointKey, usize> = HashMap::new();

    for (i, cell) in cells.iter().enumerate() {
        let corners = [
            (quantize(cell.y_min), quantize(cell.x_min)),
            (quantize(cell.y_min), quantize(cell.x_max)),
            (quantize(cell.y_max), quantize(cell.x_min)),
            (quantize(cell.y_max), quantize(cell.x_max)),
        ];
        for corner in corners {
            match corner_owner.get(&corner) {
                Some(&owner) => {
                    let a = find_root(&mut parent, owner);
                    let b = find_root(&mut parent, i);
                    if a != b {
                        parent[b] = a;
                    }
                }
                None => {
                    corner_owner.insert(corner, i);
                }
            }
        }
    }

    let mut groups: Vec<(usize, Vec<BBox>)> = Vec::new();
    for (i, cell) in cells.iter().enumerate() {
        let root = find_root(&mut parent, i);
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, group)) => group.push(*cell),
            None => groups.push((root, vec![*cell])),
        }
    }

    let mut tables: Vec<TableGrid> = groups
        .into_iter()
        .filter(|(_, group)| group.len() > 1)
        .map(|(_, mut group)| {
            group.sort_by(|a, b| a.y_min.total_cmp(&b.y_min).then(a.x_min.total_cmp(&b.x_min)));
            TableGrid { cells: group }
        })
        .collect();

    tables.sort_by(|a, b| {
        let (a, b) = (a.cells[0], b.cells[0]);
        a.y_min.total_cmp(&b.y_min).then(a.x_min.total_cmp(&b.x_min))
    });
    tables
}
