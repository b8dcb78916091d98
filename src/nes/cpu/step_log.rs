use std::collections::VecDeque;

/// Ring buffer of the most recent disassembled instruction lines
pub struct StepLog {
    history: VecDeque<String>,
    capacity: usize,
}

impl StepLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn write(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(line);
    }

    /// Up to `count` most recent lines, oldest first
    pub fn recent(&self, count: usize) -> Vec<String> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_line_dropped_when_full() {
        let mut log = StepLog::new(3);
        for i in 0..5 {
            log.write(format!("line {i}"));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.recent(10), vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn recent_returns_tail() {
        let mut log = StepLog::new(10);
        log.write("a".into());
        log.write("b".into());
        log.write("c".into());
        assert_eq!(log.recent(2), vec!["b", "c"]);
        assert!(log.recent(0).is_empty());
    }
}
