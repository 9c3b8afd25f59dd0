use anyhow::Result;
use msh_builtin::JobSummary;
use msh_types::{MshError, MshResult};
use nix::unistd::Pid;
use tracing::{debug, warn};

use super::state::ProcessState;

pub const DEFAULT_MAX_JOBS: usize = 10;

/// A background process tracked by the shell. Being in the table means it is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    pub cmd: String,
}

impl Job {
    pub fn new(pid: Pid, cmd: String) -> Self {
        Job { pid, cmd }
    }
}

/// A job removed from the table after its process terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReapedJob {
    /// 1-based position the job held right before removal
    pub position: usize,
    pub job: Job,
    pub state: ProcessState,
}

/// Bounded, insertion-ordered set of background jobs.
///
/// Positions are 1-based and derived from the current order, so they shift down
/// whenever an earlier job is removed. Pids are never duplicated.
#[derive(Debug)]
pub struct JobTable {
    jobs: Vec<Job>,
    capacity: usize,
}

impl Default for JobTable {
    fn default() -> Self {
        JobTable::new(DEFAULT_MAX_JOBS)
    }
}

impl JobTable {
    pub fn new(capacity: usize) -> Self {
        JobTable {
            jobs: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.jobs.len() >= self.capacity
    }

    /// Fails when no further job can be added. Checked before forking so that
    /// a spawned process is never left untracked.
    pub fn ensure_capacity(&self) -> MshResult<()> {
        if self.is_full() {
            return Err(MshError::JobTableFull {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Appends a job and returns its 1-based position, which equals the new table size.
    pub fn push(&mut self, job: Job) -> MshResult<usize> {
        self.ensure_capacity()?;
        if self.contains(job.pid) {
            return Err(MshError::DuplicateJob { pid: job.pid });
        }
        debug!("JOB_PUSH: pid {} cmd '{}'", job.pid, job.cmd);
        self.jobs.push(job);
        Ok(self.jobs.len())
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.jobs.iter().any(|job| job.pid == pid)
    }

    /// Removes the job owning `pid`, keeping the relative order of the rest.
    /// Returns the position it held and the job.
    pub fn remove(&mut self, pid: Pid) -> Option<(usize, Job)> {
        let index = self.jobs.iter().position(|job| job.pid == pid)?;
        let job = self.jobs.remove(index);
        debug!("JOB_REMOVE: pid {} from position {}", pid, index + 1);
        Some((index + 1, job))
    }

    pub fn summaries(&self) -> Vec<JobSummary> {
        self.jobs
            .iter()
            .enumerate()
            .map(|(index, job)| JobSummary {
                position: index + 1,
                pid: job.pid,
                cmd: job.cmd.clone(),
            })
            .collect()
    }

    /// Drains terminated children reported by `poll` until it yields `None`.
    ///
    /// Terminations of pids that are not tracked are discarded. Returns the jobs
    /// that were removed, in the order their terminations were observed.
    pub fn reap_with<F>(&mut self, mut poll: F) -> Vec<ReapedJob>
    where
        F: FnMut() -> Option<(Pid, ProcessState)>,
    {
        let mut reaped = Vec::new();
        while let Some((pid, state)) = poll() {
            match self.remove(pid) {
                Some((position, job)) => reaped.push(ReapedJob {
                    position,
                    job,
                    state,
                }),
                None => debug!("REAP_UNTRACKED: pid {} ({}) not in job table", pid, state),
            }
        }
        reaped
    }

    /// Blocks on `wait` until the table is empty.
    ///
    /// Every termination is passed to `report` together with the position the job
    /// held, or `None` for untracked children. If `wait` reports that no children
    /// remain while jobs are still tracked, those jobs can never be collected; they
    /// are dropped and returned.
    pub fn drain_with<W, R>(&mut self, mut wait: W, mut report: R) -> Result<Vec<Job>>
    where
        W: FnMut() -> Result<Option<(Pid, ProcessState)>>,
        R: FnMut(Pid, ProcessState, Option<usize>) -> Result<()>,
    {
        while !self.is_empty() {
            match wait()? {
                Some((pid, state)) => {
                    let position = self.remove(pid).map(|(position, _)| position);
                    report(pid, state, position)?;
                }
                None => {
                    let lost = std::mem::take(&mut self.jobs);
                    warn!(
                        "DRAIN_NO_CHILDREN: {} tracked jobs have no child process left",
                        lost.len()
                    );
                    return Ok(lost);
                }
            }
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn pid(raw: i32) -> Pid {
        Pid::from_raw(raw)
    }

    fn table_with(pids: &[i32]) -> JobTable {
        let mut table = JobTable::default();
        for raw in pids {
            table.push(Job::new(pid(*raw), format!("job {raw}"))).unwrap();
        }
        table
    }

    fn pids(table: &JobTable) -> Vec<i32> {
        table
            .summaries()
            .iter()
            .map(|job| job.pid.as_raw())
            .collect()
    }

    fn position_of(table: &JobTable, raw: i32) -> Option<usize> {
        table
            .summaries()
            .into_iter()
            .find(|job| job.pid.as_raw() == raw)
            .map(|job| job.position)
    }

    /// Poller that hands out the scripted terminations once, then reports nothing.
    fn scripted(events: &[i32]) -> impl FnMut() -> Option<(Pid, ProcessState)> {
        let mut queue: VecDeque<i32> = events.iter().copied().collect();
        move || queue.pop_front().map(|raw| (pid(raw), ProcessState::exited(0)))
    }

    #[test]
    fn push_reports_table_size() {
        let mut table = JobTable::default();
        assert_eq!(table.push(Job::new(pid(10), "a".into())).unwrap(), 1);
        assert_eq!(table.push(Job::new(pid(11), "b".into())).unwrap(), 2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn duplicate_pid_is_rejected() {
        let mut table = table_with(&[10, 11]);
        match table.push(Job::new(pid(10), "again".into())) {
            Err(MshError::DuplicateJob { pid: p }) => assert_eq!(p, pid(10)),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(pids(&table), vec![10, 11]);
    }

    #[test]
    fn capacity_is_an_explicit_error() {
        let mut table = JobTable::new(2);
        table.push(Job::new(pid(1), "a".into())).unwrap();
        table.push(Job::new(pid(2), "b".into())).unwrap();
        assert!(table.is_full());
        assert!(matches!(
            table.ensure_capacity(),
            Err(MshError::JobTableFull { capacity: 2 })
        ));
        assert!(matches!(
            table.push(Job::new(pid(3), "c".into())),
            Err(MshError::JobTableFull { capacity: 2 })
        ));
        assert_eq!(pids(&table), vec![1, 2]);

        table.remove(pid(1));
        assert!(table.ensure_capacity().is_ok());
    }

    #[test]
    fn removal_preserves_order_and_shifts_positions() {
        let mut table = table_with(&[1, 2, 3, 4]);
        assert_eq!(position_of(&table, 3), Some(3));

        let (position, job) = table.remove(pid(2)).unwrap();
        assert_eq!(position, 2);
        assert_eq!(job.pid, pid(2));
        assert_eq!(pids(&table), vec![1, 3, 4]);
        assert_eq!(position_of(&table, 3), Some(2));

        assert!(table.remove(pid(2)).is_none());
        assert_eq!(pids(&table), vec![1, 3, 4]);
    }

    #[test]
    fn mixed_operations_keep_invariants() {
        let mut table = JobTable::default();
        let mut expected: Vec<i32> = Vec::new();
        // deterministic mix of appends and removals
        for step in 0..60 {
            let raw = (step * 7) % 13 + 100;
            if step % 3 == 2 {
                let victim = expected.first().copied().unwrap_or(raw);
                table.remove(pid(victim));
                expected.retain(|p| *p != victim);
            } else {
                let res = table.push(Job::new(pid(raw), "x".into()));
                if expected.contains(&raw) {
                    assert!(res.is_err());
                } else if expected.len() >= DEFAULT_MAX_JOBS {
                    assert!(res.is_err());
                } else {
                    assert!(res.is_ok());
                    expected.push(raw);
                }
            }
            let current = pids(&table);
            assert_eq!(current, expected);
            let mut dedup = current.clone();
            dedup.sort();
            dedup.dedup();
            assert_eq!(dedup.len(), current.len());
        }
    }

    #[test]
    fn summaries_use_current_positions() {
        let mut table = table_with(&[5, 6, 7]);
        table.remove(pid(5));
        let summaries = table.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].position, 1);
        assert_eq!(summaries[0].pid, pid(6));
        assert_eq!(summaries[1].position, 2);
        assert_eq!(summaries[1].cmd, "job 7");
    }

    #[test]
    fn reap_removes_tracked_and_discards_untracked() {
        let mut table = table_with(&[1, 2, 3]);
        let reaped = table.reap_with(scripted(&[2, 99, 1]));
        let positions: Vec<usize> = reaped.iter().map(|r| r.position).collect();
        // 2 held position 2; after that, 1 still held position 1
        assert_eq!(positions, vec![2, 1]);
        assert_eq!(pids(&table), vec![3]);
    }

    #[test]
    fn reap_is_idempotent() {
        let mut table = table_with(&[1, 2]);
        let first = table.reap_with(scripted(&[1]));
        assert_eq!(first.len(), 1);
        assert_eq!(pids(&table), vec![2]);

        // the kernel only reports a pid once; a second sweep sees nothing
        let second = table.reap_with(scripted(&[]));
        assert!(second.is_empty());
        assert_eq!(pids(&table), vec![2]);
    }

    #[test]
    fn reap_on_empty_table() {
        let mut table = JobTable::default();
        assert!(table.reap_with(scripted(&[42])).is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn drain_reports_every_termination_in_any_order() {
        for order in [[1, 2, 3], [3, 2, 1], [2, 3, 1]] {
            let mut table = table_with(&[1, 2, 3]);
            let mut poll = scripted(&order);
            let mut lines = Vec::new();
            let lost = table
                .drain_with(
                    || Ok(poll()),
                    |p, _, position| {
                        lines.push((p.as_raw(), position));
                        Ok(())
                    },
                )
                .unwrap();
            assert!(lost.is_empty());
            assert!(table.is_empty());
            assert_eq!(lines.len(), 3);
            assert!(lines.iter().all(|(_, position)| position.is_some()));
        }
    }

    #[test]
    fn drain_reports_untracked_children_without_touching_table() {
        let mut table = table_with(&[1]);
        let mut poll = scripted(&[50, 1]);
        let mut lines = Vec::new();
        table
            .drain_with(
                || Ok(poll()),
                |p, _, position| {
                    lines.push((p.as_raw(), position));
                    Ok(())
                },
            )
            .unwrap();
        assert_eq!(lines, vec![(50, None), (1, Some(1))]);
        assert!(table.is_empty());
    }

    #[test]
    fn drain_stops_when_no_children_remain() {
        let mut table = table_with(&[1, 2]);
        let mut poll = scripted(&[1]);
        let lost = table
            .drain_with(|| Ok(poll()), |_, _, _| Ok(()))
            .unwrap();
        assert_eq!(lost.len(), 1);
        assert_eq!(lost[0].pid, pid(2));
        assert!(table.is_empty());
    }

    #[test]
    fn drain_on_empty_table_does_not_wait() {
        let mut table = JobTable::default();
        let mut calls = 0;
        table
            .drain_with(
                || {
                    calls += 1;
                    Ok(None)
                },
                |_, _, _| Ok(()),
            )
            .unwrap();
        assert_eq!(calls, 0);
    }
}
