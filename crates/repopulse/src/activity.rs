use crate::config::ActivityToggles;
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

/// The fixed activity set the cycle runner draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    /// Generate a file, commit it, push to the default branch.
    CommitContent,
    /// Open an issue on the remote repository.
    OpenIssue,
    /// Branch, commit, push, open a pull request, merge it.
    OpenAndMergePr,
}

impl Activity {
    pub const ALL: [Activity; 3] = [
        Activity::CommitContent,
        Activity::OpenIssue,
        Activity::OpenAndMergePr,
    ];
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Activity::CommitContent => "creating and committing content",
            Activity::OpenIssue => "creating GitHub issue",
            Activity::OpenAndMergePr => "creating and merging PR",
        };
        f.write_str(label)
    }
}

impl ActivityToggles {
    /// The pool of activities the configuration allows.
    pub fn enabled(&self) -> Vec<Activity> {
        Activity::ALL
            .into_iter()
            .filter(|activity| match activity {
                Activity::CommitContent => self.create_content,
                Activity::OpenIssue => self.create_issues,
                Activity::OpenAndMergePr => self.create_prs,
            })
            .collect()
    }
}

/// Select a non-empty random subset of the enabled pool, in random order,
/// without replacement. An empty pool yields an empty selection.
pub fn select_activities<R: Rng + ?Sized>(rng: &mut R, enabled: &[Activity]) -> Vec<Activity> {
    if enabled.is_empty() {
        return Vec::new();
    }
    let mut pool = enabled.to_vec();
    pool.shuffle(rng);
    let count = rng.random_range(1..=pool.len());
    pool.truncate(count);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_all_toggles_on_enables_full_pool() {
        let pool = ActivityToggles::default().enabled();
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_disabled_toggles_filter_the_pool() {
        let toggles = ActivityToggles {
            create_issues: false,
            create_prs: true,
            create_content: false,
        };
        assert_eq!(toggles.enabled(), vec![Activity::OpenAndMergePr]);
    }

    #[test]
    fn test_selection_is_nonempty_distinct_subset() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = ActivityToggles::default().enabled();

        for _ in 0..200 {
            let selected = select_activities(&mut rng, &pool);
            assert!(!selected.is_empty());
            assert!(selected.len() <= pool.len());
            for (i, a) in selected.iter().enumerate() {
                assert!(pool.contains(a));
                assert!(!selected[i + 1..].contains(a), "duplicate {:?}", a);
            }
        }
    }

    #[test]
    fn test_selection_never_includes_disabled() {
        let mut rng = StdRng::seed_from_u64(11);
        let toggles = ActivityToggles {
            create_issues: true,
            create_prs: false,
            create_content: true,
        };
        let pool = toggles.enabled();

        for _ in 0..200 {
            let selected = select_activities(&mut rng, &pool);
            assert!(!selected.contains(&Activity::OpenAndMergePr));
        }
    }

    #[test]
    fn test_selection_covers_all_subset_sizes() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool = ActivityToggles::default().enabled();
        let mut seen = [false; 3];
        for _ in 0..500 {
            let selected = select_activities(&mut rng, &pool);
            seen[selected.len() - 1] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn test_empty_pool_yields_empty_selection() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_activities(&mut rng, &[]).is_empty());
    }
}
