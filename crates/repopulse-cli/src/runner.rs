use anyhow::{Context, Result, bail};
use rand::Rng;
use rand::seq::IndexedRandom;
use repopulse::{Activity, Settings, select_activities, write_generated};
use repopulse_git::GitWorkspace;
use repopulse_github::GithubClient;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

// ============================================================================
// Templates
// ============================================================================

const ISSUE_TITLES: [&str; 10] = [
    "Enhancement: Improve user experience",
    "Bug: Fix navigation issue",
    "Feature: Add new functionality",
    "Documentation: Update README",
    "Performance: Optimize loading times",
    "Security: Update dependencies",
    "Refactor: Code cleanup needed",
    "Testing: Add unit tests",
    "UI: Design improvements",
    "API: Endpoint optimization",
];

const ISSUE_BODIES: [&str; 3] = [
    "## Description\nThis issue needs attention.\n\n## Steps to reproduce\n1. Step one\n2. Step two\n\n## Expected behavior\nDescribe expected behavior here.",
    "## Summary\nProposed enhancement to improve the system.\n\n## Benefits\n- Improved performance\n- Better user experience\n\n## Implementation\nSuggested approach here.",
    "## Bug Report\nFound an issue that needs fixing.\n\n## Environment\n- Browser: Chrome\n- OS: Linux\n\n## Additional context\nMore details here.",
];

const ISSUE_LABELS: [&str; 5] = [
    "bug",
    "enhancement",
    "documentation",
    "good first issue",
    "help wanted",
];

const BRANCH_NAMES: [&str; 10] = [
    "feature/new-component",
    "bugfix/navigation-fix",
    "enhancement/ui-improvements",
    "feature/api-updates",
    "hotfix/critical-bug",
    "feature/user-dashboard",
    "improvement/performance",
    "feature/data-export",
    "bugfix/form-validation",
    "enhancement/accessibility",
];

fn commit_message<R: Rng + ?Sized>(rng: &mut R, file: &str) -> String {
    match rng.random_range(0..5) {
        0 => format!("Add {}", file),
        1 => format!("Create new content: {}", file),
        2 => format!("Generate automated content: {}", file),
        3 => format!("Update repository with {}", file),
        _ => format!("Auto-commit: {}", file),
    }
}

fn pr_title<R: Rng + ?Sized>(rng: &mut R, file: &str) -> String {
    match rng.random_range(0..4) {
        0 => format!("Add new feature: {}", file),
        1 => format!("Implement {}", file),
        2 => format!("Update repository with {}", file),
        _ => format!("Feature: {} addition", file),
    }
}

fn pr_body(file: &str) -> String {
    format!(
        "## Changes\n- Added {}\n- Auto-generated content for testing\n\n\
         ## Testing\n- [x] File created successfully\n- [x] Content is valid\n\n\
         ## Notes\nThis is an automated PR created by repopulse.\n",
        file
    )
}

// ============================================================================
// Pacing
// ============================================================================

/// Delays the runner observes between and inside activities. Injectable so
/// tests can run without wall-clock waits.
#[derive(Debug, Clone)]
pub struct Pacing {
    /// Seconds slept between activities in a cycle, drawn uniformly.
    pub between_activities: RangeInclusive<u64>,
    /// Pause before retrying after an unexpected cycle error.
    pub recovery: Duration,
    /// Interval between pull-request mergeability polls.
    pub merge_poll_interval: Duration,
    /// Maximum number of mergeability polls before giving up.
    pub merge_poll_attempts: u32,
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing {
            between_activities: 5..=15,
            recovery: Duration::from_secs(300),
            merge_poll_interval: Duration::from_secs(2),
            merge_poll_attempts: 15,
        }
    }
}

impl Pacing {
    /// No waiting at all; for tests.
    pub fn immediate() -> Self {
        Pacing {
            between_activities: 0..=0,
            recovery: Duration::ZERO,
            merge_poll_interval: Duration::ZERO,
            merge_poll_attempts: 3,
        }
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Executes update cycles against one repository checkout.
///
/// The GitHub client and git workspace are passed in explicitly so tests can
/// substitute a mock server or a throwaway checkout.
pub struct Runner {
    github: GithubClient,
    git: GitWorkspace,
    settings: Settings,
    pacing: Pacing,
}

impl Runner {
    pub fn new(github: GithubClient, git: GitWorkspace, settings: Settings) -> Self {
        Runner {
            github,
            git,
            settings,
            pacing: Pacing::default(),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Run one update cycle: pick a random subset of the enabled activities
    /// and execute them in random order. Individual activity failures are
    /// logged and never abort the cycle.
    pub fn run_single_cycle(&self) -> Result<()> {
        let enabled = self.settings.activities.enabled();
        if enabled.is_empty() {
            warn!("all activities are disabled by configuration; nothing to do");
            return Ok(());
        }

        let mut rng = rand::rng();
        let selected = select_activities(&mut rng, &enabled);

        info!(activities = selected.len(), "starting update cycle");
        for activity in selected {
            info!("executing: {}", activity);
            match self.run_activity(activity) {
                Ok(()) => info!("completed: {}", activity),
                Err(err) => warn!("failed: {}: {:#}", activity, err),
            }
            self.pause_between_activities(&mut rng);
        }
        info!("update cycle completed");
        Ok(())
    }

    /// Run cycles forever, one per interval, until the shutdown flag is set.
    /// An unexpected cycle error pauses for the recovery delay and retries.
    pub fn run_continuous(&self, shutdown: &AtomicBool) {
        let interval = Duration::from_secs(self.settings.interval_minutes * 60);
        run_loop(
            || self.run_single_cycle(),
            interval,
            self.pacing.recovery,
            shutdown,
        );
    }

    fn run_activity(&self, activity: Activity) -> Result<()> {
        match activity {
            Activity::CommitContent => self.commit_content(),
            Activity::OpenIssue => self.open_issue(),
            Activity::OpenAndMergePr => self.open_and_merge_pr(),
        }
    }

    fn commit_content(&self) -> Result<()> {
        let mut rng = rand::rng();
        let file = write_generated(&self.settings.base_dir, &mut rng)?;
        info!("created file: {}", file.relative_path);

        self.git.add(&file.relative_path)?;
        self.git.commit(&commit_message(&mut rng, &file.relative_path))?;
        self.git.push("origin", &self.settings.default_branch)?;

        info!("committed and pushed: {}", file.relative_path);
        Ok(())
    }

    fn open_issue(&self) -> Result<()> {
        let mut rng = rand::rng();
        let title = ISSUE_TITLES.choose(&mut rng).unwrap_or(&ISSUE_TITLES[0]);
        let body = ISSUE_BODIES.choose(&mut rng).unwrap_or(&ISSUE_BODIES[0]);
        let label_count = rng.random_range(1..=3);
        let labels: Vec<String> = ISSUE_LABELS
            .choose_multiple(&mut rng, label_count)
            .map(|l| l.to_string())
            .collect();

        let issue = self
            .github
            .create_issue(&self.settings.repo, title, body, &labels)?;
        info!("created issue #{}: {}", issue.number, issue.title);
        Ok(())
    }

    fn open_and_merge_pr(&self) -> Result<()> {
        let mut rng = rand::rng();
        let branch = format!(
            "{}-{}",
            BRANCH_NAMES.choose(&mut rng).unwrap_or(&BRANCH_NAMES[0]),
            rng.random_range(100..1000)
        );

        let result = self.pull_request_steps(&branch, &mut rng);
        if result.is_err() {
            // Best effort: never leave the checkout stranded on the feature
            // branch. Errors from the recovery itself are swallowed.
            if let Err(recovery_err) = self.git.checkout(&self.settings.default_branch) {
                debug!(
                    "could not switch back to {}: {}",
                    self.settings.default_branch, recovery_err
                );
            }
        }
        result
    }

    fn pull_request_steps<R: Rng + ?Sized>(&self, branch: &str, rng: &mut R) -> Result<()> {
        let base = &self.settings.default_branch;

        self.git.create_branch(branch)?;
        let file = write_generated(&self.settings.base_dir, rng)?;
        self.git.add(&file.relative_path)?;
        self.git
            .commit(&format!("Add {} for PR", file.relative_path))?;
        self.git.push("origin", branch)?;

        let pr = self.github.create_pull(
            &self.settings.repo,
            &pr_title(rng, &file.relative_path),
            &pr_body(&file.relative_path),
            branch,
            base,
        )?;
        info!("created PR #{}: {}", pr.number, pr.title);

        self.wait_until_mergeable(pr.number)?;

        let outcome =
            self.github
                .merge_pull(&self.settings.repo, pr.number, &format!("Merge PR #{}", pr.number))?;
        if !outcome.merged {
            bail!(
                "GitHub declined to merge PR #{}: {}",
                pr.number,
                outcome.message.unwrap_or_default()
            );
        }
        info!("merged PR #{}", pr.number);

        self.git.checkout(base)?;
        self.git.pull("origin", base)?;
        self.git.delete_branch(branch)?;
        Ok(())
    }

    /// Poll until GitHub has computed the pull request as mergeable.
    ///
    /// A freshly opened PR reports `mergeable: null` until the backend has
    /// run the merge check; a definitive `false` or running out of polls is
    /// a failure.
    fn wait_until_mergeable(&self, number: u64) -> Result<()> {
        for attempt in 1..=self.pacing.merge_poll_attempts {
            let pr = self
                .github
                .get_pull(&self.settings.repo, number)
                .with_context(|| format!("polling mergeability of PR #{}", number))?;

            match pr.mergeable {
                Some(true) => return Ok(()),
                Some(false) => bail!("PR #{} is not mergeable", number),
                None => {
                    debug!(attempt, "PR #{} mergeability not yet computed", number);
                    std::thread::sleep(self.pacing.merge_poll_interval);
                }
            }
        }
        bail!(
            "PR #{} mergeability did not settle after {} polls",
            number,
            self.pacing.merge_poll_attempts
        )
    }

    fn pause_between_activities<R: Rng + ?Sized>(&self, rng: &mut R) {
        let secs = rng.random_range(self.pacing.between_activities.clone());
        if secs > 0 {
            debug!("sleeping {}s before next activity", secs);
            std::thread::sleep(Duration::from_secs(secs));
        }
    }
}

// ============================================================================
// Continuous loop
// ============================================================================

/// Drive `cycle` once per `interval` until `shutdown` is set. A failing cycle
/// waits `recovery` before the next attempt instead of crashing the loop.
pub fn run_loop<F>(mut cycle: F, interval: Duration, recovery: Duration, shutdown: &AtomicBool)
where
    F: FnMut() -> Result<()>,
{
    while !shutdown.load(Ordering::SeqCst) {
        match cycle() {
            Ok(()) => {
                if let Ok(delta) = chrono::Duration::from_std(interval) {
                    let next = chrono::Local::now() + delta;
                    info!(
                        "next update cycle scheduled for {}",
                        next.format("%Y-%m-%d %H:%M:%S")
                    );
                }
                interruptible_sleep(interval, shutdown);
            }
            Err(err) => {
                warn!("unexpected cycle error: {:#}", err);
                info!("waiting {}s before retry", recovery.as_secs());
                interruptible_sleep(recovery, shutdown);
            }
        }
    }
    info!("stopping continuous mode");
}

/// Sleep in small chunks so a shutdown request is observed promptly.
fn interruptible_sleep(total: Duration, shutdown: &AtomicBool) {
    const CHUNK: Duration = Duration::from_millis(250);
    let mut remaining = total;
    while remaining > Duration::ZERO && !shutdown.load(Ordering::SeqCst) {
        let step = remaining.min(CHUNK);
        std::thread::sleep(step);
        remaining -= step;
    }
}
