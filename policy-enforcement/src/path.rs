use crate::models::ResourcePath;

/// Relative position of a tree node's path with respect to a target path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathLocation {
    /// The node path is a strict prefix of the target: the rule is coarser
    /// than the question but still applies to it
    Above,
    /// Node and target are the same path
    Same,
    /// The target is a strict prefix of the node path: the rule sits on
    /// something nested inside the resource being asked about
    Below,
    /// Neither path is a prefix of the other
    Different,
}

impl ResourcePath {
    /// Classify where `self` sits relative to `target`.
    ///
    /// Pure comparison of segment sequences, O(min(len)).
    pub fn locate(&self, target: &ResourcePath) -> PathLocation {
        let diverged = self
            .segments()
            .iter()
            .zip(target.segments())
            .any(|(a, b)| a != b);
        if diverged {
            return PathLocation::Different;
        }
        match self.len().cmp(&target.len()) {
            std::cmp::Ordering::Equal => PathLocation::Same,
            std::cmp::Ordering::Less => PathLocation::Above,
            std::cmp::Ordering::Greater => PathLocation::Below,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(pointer: &str) -> ResourcePath {
        ResourcePath::from_pointer(pointer).unwrap()
    }

    #[test]
    fn same_path_locates_same() {
        assert_eq!(path("/a/b").locate(&path("/a/b")), PathLocation::Same);
        assert_eq!(path("/").locate(&path("/")), PathLocation::Same);
    }

    #[test]
    fn strict_prefix_is_above_and_complement_is_below() {
        let a = path("/features");
        let b = path("/features/temp");
        assert_eq!(a.locate(&b), PathLocation::Above);
        assert_eq!(b.locate(&a), PathLocation::Below);
    }

    #[test]
    fn root_is_above_everything_else() {
        assert_eq!(path("/").locate(&path("/features")), PathLocation::Above);
        assert_eq!(path("/features").locate(&path("/")), PathLocation::Below);
    }

    #[test]
    fn unrelated_paths_are_different_both_ways() {
        let a = path("/features/temp");
        let c = path("/attributes/location");
        assert_eq!(a.locate(&c), PathLocation::Different);
        assert_eq!(c.locate(&a), PathLocation::Different);
    }

    #[test]
    fn diverging_below_a_shared_prefix_is_different() {
        let a = path("/features/temp");
        let b = path("/features/humidity/value");
        assert_eq!(a.locate(&b), PathLocation::Different);
        assert_eq!(b.locate(&a), PathLocation::Different);
    }
}
