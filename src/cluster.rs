use crate::model::TextAnchor;

/// Anchors judged to sit on the same output row.
///
/// The band's Y is frozen at its first member; later members are compared
/// against that value, never against a running centre.
#[derive(Debug, Clone, PartialEq)]
pub struct RowBand {
    anchors: Vec<TextAnchor>,
}

impl RowBand {
    fn start(anchor: TextAnchor) -> Self {
        Self {
            anchors: vec![anchor],
        }
    }

    #[must_use]
    pub fn representative_y(&self) -> f64 {
        self.anchors[0].y
    }

    #[must_use]
    pub fn anchors(&self) -> &[TextAnchor] {
        &self.anchors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

impl AsRef<[TextAnchor]> for RowBand {
    fn as_ref(&self) -> &[TextAnchor] {
        &self.anchors
    }
}

/// Groups anchors into horizontal bands, scanning from the top of the drawing.
///
/// Each anchor joins the first band whose representative Y is within
/// `y_threshold`, or opens a new band. Since anchors are visited in
/// descending Y, bands come out in descending representative Y already.
#[must_use]
pub fn cluster_rows(anchors: &[TextAnchor], y_threshold: f64) -> Vec<RowBand> {
    let mut ordered = anchors.to_vec();
    ordered.sort_by(|left, right| right.y.total_cmp(&left.y));

    let mut bands: Vec<RowBand> = Vec::new();
    for anchor in ordered {
        match bands
            .iter_mut()
            .find(|band| (band.representative_y() - anchor.y).abs() <= y_threshold)
        {
            Some(band) => band.anchors.push(anchor),
            None => bands.push(RowBand::start(anchor)),
        }
    }

    bands
}

#[cfg(test)]
mod tests {
    use super::cluster_rows;
    use crate::model::TextAnchor;

    #[test]
    fn groups_anchors_within_threshold() {
        let anchors = vec![
            TextAnchor::new(0.0, 80.0, "Alice"),
            TextAnchor::new(0.0, 100.0, "Name"),
            TextAnchor::new(50.0, 99.0, "Age"),
            TextAnchor::new(50.0, 80.5, "30"),
        ];
        let bands = cluster_rows(&anchors, 2.5);

        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].representative_y(), 100.0);
        assert_eq!(bands[0].len(), 2);
        assert_eq!(bands[1].representative_y(), 80.5);
        assert_eq!(bands[1].len(), 2);
    }

    #[test]
    fn representative_stays_frozen() {
        // 10.0 -> 8.0 joins, 6.0 is 4 away from the frozen 10.0 and starts a new band
        let anchors = vec![
            TextAnchor::new(0.0, 10.0, "a"),
            TextAnchor::new(0.0, 8.0, "b"),
            TextAnchor::new(0.0, 6.0, "c"),
        ];
        let bands = cluster_rows(&anchors, 2.5);
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].representative_y(), 10.0);
        assert_eq!(bands[1].representative_y(), 6.0);
    }

    #[test]
    fn every_anchor_lands_in_exactly_one_band() {
        let anchors = (0..20)
            .map(|index| TextAnchor::new(f64::from(index % 4) * 10.0, f64::from(index), "t"))
            .collect::<Vec<_>>();
        let bands = cluster_rows(&anchors, 2.5);
        let total = bands.iter().map(|band| band.len()).sum::<usize>();
        assert_eq!(total, anchors.len());
    }

    #[test]
    fn bands_come_out_top_down() {
        let anchors = vec![
            TextAnchor::new(0.0, 3.0, "low"),
            TextAnchor::new(0.0, 30.0, "high"),
            TextAnchor::new(0.0, 15.0, "mid"),
        ];
        let ys = cluster_rows(&anchors, 2.5)
            .iter()
            .map(|band| band.representative_y())
            .collect::<Vec<_>>();
        assert_eq!(ys, vec![30.0, 15.0, 3.0]);
    }

    #[test]
    fn no_anchors_no_bands() {
        assert!(cluster_rows(&[], 2.5).is_empty());
    }
}
