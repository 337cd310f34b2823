//! Execution plans and the capacity grid.
//!
//! The grid is an audit artifact: one row per capacity unit, one column per
//! tick, each cell holding the id of the job occupying that unit (0 when
//! idle). It is rebuilt from the completed jobs' run segments on demand; a
//! placement that cannot find room proves the run violated the capacity
//! invariant and is fatal.

use std::fmt;

use crate::error::SchedulerError;
use crate::job::{Job, JobId};

/// The complete outcome of a scheduler run: every input job, finished or
/// dropped, with its timing, segments and score filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    capacity: u64,
    completed: Vec<Job>,
    dropped: Vec<Job>,
}

impl ExecutionPlan {
    pub(crate) fn new(capacity: u64, completed: Vec<Job>, dropped: Vec<Job>) -> Self {
        Self {
            capacity,
            completed,
            dropped,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Finished jobs, in finish order.
    pub fn completed(&self) -> &[Job] {
        &self.completed
    }

    /// Jobs dropped for horizon reasons, in drop order.
    pub fn dropped(&self) -> &[Job] {
        &self.dropped
    }

    /// Latest tick any completed job ran, if any completed.
    pub fn max_end_time(&self) -> Option<u64> {
        self.completed.iter().filter_map(Job::actual_end_time).max()
    }

    /// Build the capacity grid from the completed jobs' run segments.
    ///
    /// Per segment tick, the job id is written into the first contiguous
    /// free block of `segment.bandwidth` rows; columns are then sorted
    /// ascending for a stable rendering.
    pub fn grid(&self) -> Result<Grid, SchedulerError> {
        let ticks = self.max_end_time().map_or(0, |end| end + 1);
        let mut grid = Grid::new(self.capacity as usize, ticks as usize);
        for job in &self.completed {
            for segment in job.run_log() {
                for tick in segment.start..=segment.end {
                    grid.place(job.id(), segment.bandwidth, tick)?;
                }
            }
        }
        grid.sort_columns();
        Ok(grid)
    }
}

/// Row-major `capacity x ticks` matrix of job ids, 0 for idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    capacity: usize,
    ticks: usize,
    cells: Vec<JobId>,
}

impl Grid {
    fn new(capacity: usize, ticks: usize) -> Self {
        Self {
            capacity,
            ticks,
            cells: vec![0; capacity * ticks],
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn get(&self, row: usize, tick: usize) -> JobId {
        self.cells[row * self.ticks + tick]
    }

    fn set(&mut self, row: usize, tick: usize, id: JobId) {
        self.cells[row * self.ticks + tick] = id;
    }

    fn place(&mut self, id: JobId, bandwidth: u64, tick: u64) -> Result<(), SchedulerError> {
        let need = bandwidth as usize;
        if need == 0 {
            return Ok(());
        }
        let tick = tick as usize;
        let mut row = 0;
        while row + need <= self.capacity {
            if (row..row + need).all(|r| self.get(r, tick) == 0) {
                for r in row..row + need {
                    self.set(r, tick, id);
                }
                return Ok(());
            }
            row += 1;
        }
        Err(SchedulerError::InvariantBreach(format!(
            "grid placement failed: no free {need}-row block at tick {tick} for job {id}"
        )))
    }

    fn sort_columns(&mut self) {
        for tick in 0..self.ticks {
            let mut column: Vec<JobId> = (0..self.capacity).map(|r| self.get(r, tick)).collect();
            column.sort_unstable();
            for (row, id) in column.into_iter().enumerate() {
                self.set(row, tick, id);
            }
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\t")?;
        for tick in 0..self.ticks {
            write!(f, "{tick}\t")?;
        }
        writeln!(f)?;
        for row in 0..self.capacity {
            write!(f, "{row}:\t")?;
            for tick in 0..self.ticks {
                write!(f, "{}\t", self.get(row, tick))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Priority;

    fn finished_job(id: JobId, bandwidth: u64, start: u64, duration: u64) -> Job {
        let mut job = Job::new(id, bandwidth, bandwidth, start, duration, Priority::Regular);
        job.start(start).unwrap();
        for _ in 0..duration {
            job.tick_work().unwrap();
        }
        job.finish(start + duration).unwrap();
        job
    }

    #[test]
    fn empty_plan_has_an_empty_grid() {
        let plan = ExecutionPlan::new(5, vec![], vec![]);
        assert_eq!(plan.max_end_time(), None);
        let grid = plan.grid().unwrap();
        assert_eq!(grid.ticks(), 0);
    }

    #[test]
    fn each_column_holds_exactly_the_job_bandwidth() {
        let plan = ExecutionPlan::new(
            10,
            vec![finished_job(1, 4, 0, 3), finished_job(2, 6, 0, 2)],
            vec![],
        );
        let grid = plan.grid().unwrap();
        assert_eq!(grid.ticks(), 3);

        for tick in 0..3 {
            let ones = (0..10).filter(|&r| grid.get(r, tick) == 1).count();
            let twos = (0..10).filter(|&r| grid.get(r, tick) == 2).count();
            assert_eq!(ones, 4);
            assert_eq!(twos, if tick < 2 { 6 } else { 0 });
        }
    }

    #[test]
    fn columns_are_sorted_ascending() {
        let plan = ExecutionPlan::new(
            10,
            vec![finished_job(3, 2, 0, 1), finished_job(1, 2, 0, 1)],
            vec![],
        );
        let grid = plan.grid().unwrap();

        let column: Vec<JobId> = (0..10).map(|r| grid.get(r, 0)).collect();
        let mut sorted = column.clone();
        sorted.sort_unstable();
        assert_eq!(column, sorted);
    }

    #[test]
    fn overcommitted_segments_are_a_fatal_breach() {
        // Two jobs of 6 units overlapping on 10 capacity cannot both place.
        let plan = ExecutionPlan::new(
            10,
            vec![finished_job(1, 6, 0, 2), finished_job(2, 6, 0, 2)],
            vec![],
        );
        let err = plan.grid().unwrap_err();
        assert!(matches!(err, SchedulerError::InvariantBreach(_)));
    }

    #[test]
    fn render_includes_header_and_rows() {
        let plan = ExecutionPlan::new(2, vec![finished_job(1, 1, 0, 2)], vec![]);
        let grid = plan.grid().unwrap();
        let text = grid.to_string();

        assert!(text.starts_with("\t0\t1\t"));
        assert!(text.contains("0:\t"));
        assert!(text.contains("1:\t"));
    }
}
