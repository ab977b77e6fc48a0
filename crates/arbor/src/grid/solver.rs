//! Track sizing for one axis of a grid.
//!
//! The solver is a pure function of the proportion sequence, the spacing
//! between tracks, the measured extents of the placed children and the space
//! available. Rows and columns are solved independently with the same code.

use super::Proportion;

/// A child's footprint on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackItem {
    /// First track occupied.
    pub start: usize,
    /// Number of tracks occupied, at least one.
    pub span: usize,
    /// Measured extent along the axis, including margin.
    pub size: u32,
}

impl TrackItem {
    /// Construct a track item.
    pub fn new(start: usize, span: usize, size: u32) -> Self {
        Self { start, span, size }
    }
}

/// Fixed-point scale used to turn fractional `Part` weights into integers.
const WEIGHT_SCALE: f32 = 1000.0;

/// Integer weight for a `Part` proportion. Non-finite or non-positive weights
/// contribute nothing.
fn part_weight(weight: f32) -> u64 {
    if weight.is_finite() && weight > 0.0 {
        ((weight * WEIGHT_SCALE).round() as u64).max(1)
    } else {
        0
    }
}

/// Clamp an item so it lies within `count` tracks.
pub(crate) fn clamp_item(item: TrackItem, count: usize) -> TrackItem {
    let last = count.saturating_sub(1);
    let start = item.start.min(last);
    let span = item.span.max(1).min(count - start);
    TrackItem {
        start,
        span,
        size: item.size,
    }
}

/// Split `total` pixels across `weights`.
///
/// Each share starts at the floor of its exact proportional value. Remaining
/// pixels go one at a time to the share with the lowest next threshold
/// `(share + 1) / weight`, earliest index first on ties. The result sums to
/// `total`, never shrinks any share when `total` grows, and splits evenly with
/// extra pixels on the earliest entries when weights are equal. When every
/// weight is zero the split is equal.
pub fn apportion(total: u32, weights: &[u64]) -> Vec<u32> {
    if weights.is_empty() {
        return Vec::new();
    }
    let equal;
    let weights = if weights.iter().all(|w| *w == 0) {
        equal = vec![1u64; weights.len()];
        &equal[..]
    } else {
        weights
    };
    let sum: u128 = weights.iter().map(|w| u128::from(*w)).sum();
    let mut shares: Vec<u32> = weights
        .iter()
        .map(|w| (u128::from(total) * u128::from(*w) / sum) as u32)
        .collect();
    let mut assigned: u64 = shares.iter().map(|s| u64::from(*s)).sum();
    while assigned < u64::from(total) {
        let mut best: Option<usize> = None;
        for (i, w) in weights.iter().enumerate() {
            if *w == 0 {
                continue;
            }
            best = match best {
                None => Some(i),
                Some(b) => {
                    let lhs = (u128::from(shares[i]) + 1) * u128::from(weights[b]);
                    let rhs = (u128::from(shares[b]) + 1) * u128::from(*w);
                    if lhs < rhs { Some(i) } else { Some(b) }
                }
            };
        }
        let Some(best) = best else {
            break;
        };
        shares[best] += 1;
        assigned += 1;
    }
    shares
}

/// Total spacing between `count` adjacent tracks.
fn spacing_total(count: usize, spacing: u32) -> u32 {
    let gaps = u32::try_from(count.saturating_sub(1)).unwrap_or(u32::MAX);
    gaps.saturating_mul(spacing)
}

/// Resolve track sizes for one axis.
///
/// `available` is `None` when the parent places no limit on the axis. In that
/// case `Part` and `Fill` tracks report their natural content size instead of
/// sharing leftover space: `Fill` takes the largest single-track content it
/// holds, and every `Part` track takes its weight times the largest
/// content-per-weight ratio among all `Part` tracks, so the weights keep their
/// ratio.
///
/// An empty proportion sequence behaves as a single `Auto` track. Items that
/// start past the last track or span beyond it are clamped.
pub fn solve_axis(
    proportions: &[Proportion],
    spacing: u32,
    available: Option<u32>,
    items: &[TrackItem],
) -> Vec<u32> {
    let implicit = [Proportion::Auto];
    let props = if proportions.is_empty() {
        &implicit[..]
    } else {
        proportions
    };
    let count = props.len();
    let items: Vec<TrackItem> = items.iter().map(|i| clamp_item(*i, count)).collect();
    let mut sizes = vec![0u32; count];

    // Fixed tracks.
    for (size, prop) in sizes.iter_mut().zip(props) {
        if let Proportion::Pixels(px) = prop {
            *size = *px;
        }
    }

    // Auto tracks from single-track children.
    for item in items.iter().filter(|i| i.span == 1) {
        if props[item.start] == Proportion::Auto {
            sizes[item.start] = sizes[item.start].max(item.size);
        }
    }

    if available.is_none() {
        natural_flexible(props, &items, &mut sizes);
    }

    // Spanning children can only grow the Auto tracks they cover.
    for item in items.iter().filter(|i| i.span > 1) {
        grow_spanned_auto(props, spacing, item, &mut sizes);
    }

    if let Some(available) = available {
        distribute_remaining(props, spacing, available, &mut sizes);
    }

    sizes
}

/// Natural sizes for `Part` and `Fill` tracks when space is unbounded.
fn natural_flexible(props: &[Proportion], items: &[TrackItem], sizes: &mut [u32]) {
    let mut unit = 0.0f32;
    for item in items.iter().filter(|i| i.span == 1) {
        match props[item.start] {
            Proportion::Fill => sizes[item.start] = sizes[item.start].max(item.size),
            Proportion::Part(w) if part_weight(w) > 0 => {
                unit = unit.max(item.size as f32 / w);
            }
            _ => {}
        }
    }
    for (size, prop) in sizes.iter_mut().zip(props) {
        if let Proportion::Part(w) = prop
            && part_weight(*w) > 0
        {
            *size = (unit * w).ceil() as u32;
        }
    }
}

/// Grow the `Auto` tracks under a spanning item until they fit it.
fn grow_spanned_auto(props: &[Proportion], spacing: u32, item: &TrackItem, sizes: &mut [u32]) {
    let range = item.start..item.start + item.span;
    let current = sizes[range.clone()]
        .iter()
        .fold(spacing_total(item.span, spacing), |acc, s| {
            acc.saturating_add(*s)
        });
    if item.size <= current {
        return;
    }
    let autos: Vec<usize> = range.filter(|i| props[*i] == Proportion::Auto).collect();
    if autos.is_empty() {
        return;
    }
    let weights: Vec<u64> = autos.iter().map(|i| u64::from(sizes[*i])).collect();
    let shares = apportion(item.size - current, &weights);
    for (i, share) in autos.iter().zip(shares) {
        sizes[*i] = sizes[*i].saturating_add(share);
    }
}

/// Hand out space left after fixed and Auto tracks to `Part`, then `Fill`.
fn distribute_remaining(props: &[Proportion], spacing: u32, available: u32, sizes: &mut [u32]) {
    let used = props
        .iter()
        .zip(sizes.iter())
        .filter(|(p, _)| matches!(p, Proportion::Auto | Proportion::Pixels(_)))
        .fold(spacing_total(props.len(), spacing), |acc, (_, s)| {
            acc.saturating_add(*s)
        });
    let mut remaining = available.saturating_sub(used);

    let parts: Vec<usize> = (0..props.len())
        .filter(|i| matches!(props[*i], Proportion::Part(w) if part_weight(w) > 0))
        .collect();
    for (size, prop) in sizes.iter_mut().zip(props) {
        if matches!(prop, Proportion::Part(_) | Proportion::Fill) {
            *size = 0;
        }
    }
    if !parts.is_empty() {
        let weights: Vec<u64> = parts
            .iter()
            .map(|i| match props[*i] {
                Proportion::Part(w) => part_weight(w),
                _ => 0,
            })
            .collect();
        let shares = apportion(remaining, &weights);
        for (i, share) in parts.iter().zip(shares) {
            sizes[*i] = share;
        }
        remaining -= sizes.iter().zip(props).fold(0, |acc, (s, p)| {
            if matches!(p, Proportion::Part(_)) {
                acc + s
            } else {
                acc
            }
        });
    }

    let fills: Vec<usize> = (0..props.len())
        .filter(|i| props[*i] == Proportion::Fill)
        .collect();
    let shares = apportion(remaining, &vec![1; fills.len()]);
    for (i, share) in fills.iter().zip(shares) {
        sizes[*i] = share;
    }
}

/// Start offsets of each track, relative to the grid's content origin.
pub fn track_offsets(sizes: &[u32], spacing: u32) -> Vec<u32> {
    let mut out = Vec::with_capacity(sizes.len());
    let mut pos = 0u32;
    for size in sizes {
        out.push(pos);
        pos = pos.saturating_add(*size).saturating_add(spacing);
    }
    out
}

/// Total extent of a set of tracks including spacing.
pub fn total_extent(sizes: &[u32], spacing: u32) -> u32 {
    sizes
        .iter()
        .fold(spacing_total(sizes.len(), spacing), |acc, s| {
            acc.saturating_add(*s)
        })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn pixels_auto_fill() {
        let props = [
            Proportion::Pixels(50),
            Proportion::Auto,
            Proportion::Fill,
            Proportion::Fill,
        ];
        let sizes = solve_axis(&props, 0, Some(250), &[TrackItem::new(1, 1, 30)]);
        assert_eq!(sizes, vec![50, 30, 85, 85]);
    }

    #[test]
    fn parts_by_weight() {
        let props = [Proportion::Part(1.0), Proportion::Part(3.0)];
        assert_eq!(solve_axis(&props, 0, Some(200), &[]), vec![50, 150]);
    }

    #[test]
    fn span_grows_autos_equally() {
        let props = [Proportion::Auto, Proportion::Auto];
        let items = [
            TrackItem::new(0, 1, 20),
            TrackItem::new(1, 1, 20),
            TrackItem::new(0, 2, 100),
        ];
        assert_eq!(solve_axis(&props, 0, None, &items), vec![50, 50]);
    }

    #[test]
    fn span_grows_proportionally() {
        let props = [Proportion::Auto, Proportion::Auto];
        let items = [
            TrackItem::new(0, 1, 10),
            TrackItem::new(1, 1, 30),
            TrackItem::new(0, 2, 80),
        ];
        assert_eq!(solve_axis(&props, 0, None, &items), vec![20, 60]);
    }

    #[test]
    fn span_never_shrinks_fixed() {
        let props = [Proportion::Pixels(10), Proportion::Auto];
        let items = [TrackItem::new(0, 2, 40)];
        assert_eq!(solve_axis(&props, 0, None, &items), vec![10, 30]);
    }

    #[test]
    fn span_over_fixed_only_is_ignored() {
        let props = [Proportion::Pixels(10), Proportion::Pixels(10)];
        let items = [TrackItem::new(0, 2, 100)];
        assert_eq!(solve_axis(&props, 0, None, &items), vec![10, 10]);
    }

    #[test]
    fn empty_proportions_are_one_auto() {
        let items = [TrackItem::new(0, 1, 12), TrackItem::new(3, 2, 17)];
        assert_eq!(solve_axis(&[], 0, Some(100), &items), vec![17]);
    }

    #[test]
    fn out_of_range_is_clamped() {
        let props = [Proportion::Auto, Proportion::Auto];
        let items = [TrackItem::new(9, 1, 15), TrackItem::new(0, 7, 5)];
        assert_eq!(solve_axis(&props, 0, None, &items), vec![0, 15]);
    }

    #[test]
    fn remainder_goes_to_earliest() {
        let props = [Proportion::Fill, Proportion::Fill, Proportion::Fill];
        assert_eq!(solve_axis(&props, 0, Some(11), &[]), vec![4, 4, 3]);
        let props = [Proportion::Part(1.0), Proportion::Part(1.0)];
        assert_eq!(solve_axis(&props, 0, Some(7), &[]), vec![4, 3]);
    }

    #[test]
    fn parts_leave_nothing_for_fill() {
        let props = [Proportion::Part(1.0), Proportion::Fill];
        assert_eq!(solve_axis(&props, 0, Some(90), &[]), vec![90, 0]);
    }

    #[test]
    fn overflow_keeps_natural_sizes() {
        let props = [Proportion::Pixels(80), Proportion::Auto, Proportion::Fill];
        let items = [TrackItem::new(1, 1, 40)];
        assert_eq!(solve_axis(&props, 0, Some(100), &items), vec![80, 40, 0]);
    }

    #[test]
    fn spacing_is_reserved() {
        let props = [Proportion::Fill, Proportion::Fill];
        assert_eq!(solve_axis(&props, 10, Some(100), &[]), vec![45, 45]);
        assert_eq!(total_extent(&[45, 45], 10), 100);
        assert_eq!(track_offsets(&[45, 45], 10), vec![0, 55]);
    }

    #[test]
    fn natural_part_keeps_ratio() {
        let props = [Proportion::Part(1.0), Proportion::Part(2.0), Proportion::Fill];
        let items = [
            TrackItem::new(0, 1, 30),
            TrackItem::new(1, 1, 20),
            TrackItem::new(2, 1, 7),
        ];
        assert_eq!(solve_axis(&props, 0, None, &items), vec![30, 60, 7]);
    }

    #[test]
    fn apportion_edges() {
        assert_eq!(apportion(0, &[1, 2]), vec![0, 0]);
        assert_eq!(apportion(5, &[0, 0]), vec![3, 2]);
        assert_eq!(apportion(5, &[0, 1]), vec![0, 5]);
        assert_eq!(apportion(61, &[20, 20]), vec![31, 30]);
        assert!(apportion(3, &[]).is_empty());
    }

    fn proportion() -> impl Strategy<Value = Proportion> {
        prop_oneof![
            Just(Proportion::Auto),
            (0u32..80).prop_map(Proportion::Pixels),
            (1u32..5).prop_map(|w| Proportion::Part(w as f32)),
            Just(Proportion::Fill),
        ]
    }

    fn items(tracks: usize) -> impl Strategy<Value = Vec<TrackItem>> {
        prop::collection::vec(
            (0..tracks, 1..=tracks, 0u32..120)
                .prop_map(|(start, span, size)| TrackItem::new(start, span, size)),
            0..6,
        )
    }

    proptest! {
        #[test]
        fn conservation(
            (props, items) in prop::collection::vec(proportion(), 1..6)
                .prop_flat_map(|p| { let n = p.len(); (Just(p), items(n)) }),
            spacing in 0u32..5,
            available in 0u32..800,
        ) {
            let sizes = solve_axis(&props, spacing, Some(available), &items);
            let total = total_extent(&sizes, spacing);
            let flexible = props
                .iter()
                .any(|p| matches!(p, Proportion::Part(_) | Proportion::Fill));
            let natural: Vec<u32> = sizes
                .iter()
                .zip(&props)
                .map(|(s, p)| if matches!(p, Proportion::Part(_) | Proportion::Fill) { 0 } else { *s })
                .collect();
            let required = total_extent(&natural, spacing);
            if flexible && available >= required {
                prop_assert_eq!(total, available);
            } else {
                prop_assert_eq!(total, required);
            }
        }

        #[test]
        fn span_growth_is_monotone(
            props in prop::collection::vec(
                prop_oneof![Just(Proportion::Auto), (0u32..40).prop_map(Proportion::Pixels)],
                2..6,
            ),
            singles in prop::collection::vec((0usize..6, 0u32..60), 0..6),
            start in 0usize..6,
            span in 2usize..6,
            size in 0u32..300,
            grow in 1u32..200,
        ) {
            let n = props.len();
            let mut items: Vec<TrackItem> = singles
                .iter()
                .map(|(t, s)| TrackItem::new(t % n, 1, *s))
                .collect();
            items.push(TrackItem::new(start % n, span, size));
            let before = solve_axis(&props, 0, None, &items);
            if let Some(last) = items.last_mut() {
                last.size += grow;
            }
            let after = solve_axis(&props, 0, None, &items);
            for (i, (b, a)) in before.iter().zip(&after).enumerate() {
                prop_assert!(a >= b);
                if *a > *b {
                    prop_assert_eq!(props[i], Proportion::Auto);
                }
            }
        }
    }
}
