/// Frequency and volume one oscillator is heading towards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ToneValue {
    pub frequency: f64,
    pub volume: f64,
}

impl ToneValue {
    pub fn new(frequency: f64, volume: f64) -> Self {
        Self { frequency, volume }
    }
}

/// Every oscillator's target at one step, in group then oscillator order.
///
/// Volumes already include the group gain. `time` is the target time the
/// values are reached at, not the moment the step fired.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub time: f64,
    pub groups: Vec<Vec<ToneValue>>,
}

impl Snapshot {
    /// Empty snapshot with room for `group_sizes[i]` values in group `i`.
    pub fn with_layout(group_sizes: impl IntoIterator<Item = usize>) -> Self {
        Self {
            time: 0.0,
            groups: group_sizes.into_iter().map(Vec::with_capacity).collect(),
        }
    }

    /// Overwrite `self` with `other`, reusing the existing group buffers.
    /// Does not allocate when `self` already has `other`'s layout.
    pub fn copy_from(&mut self, other: &Snapshot) {
        self.time = other.time;
        self.groups.resize_with(other.groups.len(), Vec::new);
        for (dst, src) in self.groups.iter_mut().zip(&other.groups) {
            dst.clear();
            dst.extend_from_slice(src);
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// All values flattened across groups.
    pub fn values(&self) -> impl Iterator<Item = &ToneValue> + '_ {
        self.groups.iter().flatten()
    }

    /// Loudest value in the snapshot, if any.
    pub fn loudest(&self) -> Option<ToneValue> {
        self.values()
            .copied()
            .max_by(|a, b| a.volume.total_cmp(&b.volume))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loudest_scans_all_groups() {
        let snapshot = Snapshot {
            time: 1.0,
            groups: vec![
                vec![ToneValue::new(110.0, 0.1), ToneValue::new(220.0, 0.4)],
                vec![ToneValue::new(55.0, 0.3)],
            ],
        };
        assert_eq!(snapshot.values().count(), 3);
        assert_eq!(snapshot.loudest(), Some(ToneValue::new(220.0, 0.4)));
        assert_eq!(Snapshot::default().loudest(), None);
    }

    #[test]
    fn layout_preallocates() {
        let snapshot = Snapshot::with_layout([4, 8]);
        assert_eq!(snapshot.group_count(), 2);
        assert!(snapshot.groups[1].capacity() >= 8);
        assert!(snapshot.groups.iter().all(Vec::is_empty));
    }

    #[test]
    fn copy_from_reuses_buffers() {
        let source = Snapshot {
            time: 2.5,
            groups: vec![
                vec![ToneValue::new(110.0, 0.2); 4],
                vec![ToneValue::new(220.0, 0.1); 4],
            ],
        };
        let mut slot = Snapshot::with_layout([4, 4]);
        let buffers: Vec<*const ToneValue> = slot.groups.iter().map(|g| g.as_ptr()).collect();

        slot.copy_from(&source);
        assert_eq!(slot, source);
        let after: Vec<*const ToneValue> = slot.groups.iter().map(|g| g.as_ptr()).collect();
        assert_eq!(buffers, after);

        // a smaller layout shrinks the group list
        slot.copy_from(&Snapshot::default());
        assert_eq!(slot.group_count(), 0);
    }
}
