//! Population member shared by every engine.

use super::Solution;
use crate::engine::EngineKind;

/// One candidate solution plus its fitness, tagged with the engine that
/// owns it (ant, wolf, whale or hyena).
#[derive(Debug, Clone)]
pub struct Agent {
    kind: EngineKind,
    solution: Solution,
}

impl Agent {
    /// Wraps an evaluated solution.
    pub fn new(kind: EngineKind, solution: Solution) -> Self {
        Self { kind, solution }
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn fitness(&self) -> f64 {
        self.solution.fitness()
    }

    /// Replaces the solution if `candidate` is strictly better.
    ///
    /// Returns `true` on replacement.
    pub fn accept_if_better(&mut self, candidate: Solution) -> bool {
        if candidate.fitness() < self.solution.fitness() {
            self.solution = candidate;
            true
        } else {
            false
        }
    }

    pub fn replace(&mut self, solution: Solution) {
        self.solution = solution;
    }

    pub fn into_solution(self) -> Solution {
        self.solution
    }
}

/// Index of the agent with the lowest fitness.
pub(crate) fn best_index(agents: &[Agent]) -> Option<usize> {
    agents
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.fitness().total_cmp(&b.fitness()))
        .map(|(i, _)| i)
}

/// Sorts agents by ascending fitness.
pub(crate) fn sort_by_fitness(agents: &mut [Agent]) {
    agents.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution(fitness: f64) -> Solution {
        let mut s = Solution::from_valid_routes(Vec::new());
        s.set_fitness(fitness);
        s
    }

    #[test]
    fn test_accept_if_better() {
        let mut agent = Agent::new(EngineKind::Whale, solution(10.0));
        assert!(!agent.accept_if_better(solution(10.0)));
        assert!(agent.accept_if_better(solution(9.0)));
        assert_eq!(agent.fitness(), 9.0);
        assert_eq!(agent.kind(), EngineKind::Whale);
    }

    #[test]
    fn test_best_index_and_sort() {
        let mut agents = vec![
            Agent::new(EngineKind::GreyWolf, solution(3.0)),
            Agent::new(EngineKind::GreyWolf, solution(1.0)),
            Agent::new(EngineKind::GreyWolf, solution(2.0)),
        ];
        assert_eq!(best_index(&agents), Some(1));
        sort_by_fitness(&mut agents);
        let f: Vec<f64> = agents.iter().map(Agent::fitness).collect();
        assert_eq!(f, vec![1.0, 2.0, 3.0]);
        assert_eq!(best_index(&[]), None);
    }
}
