// src/ner/perceptron.rs
//! Structured averaged perceptron over BIO tags with constrained Viterbi decoding.
//!
//! Learning keeps raw weights plus running totals stamped with the update step, so
//! the averaged weights can be produced in one pass at the end instead of summing
//! every weight after every example.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::ner::labels::{Tag, TAG_COUNT};

/// Row index in the transition table for "no previous tag".
const START: usize = TAG_COUNT;

/// Finds the best tag index sequence. `emission(i, t)` scores tag `t` at position `i`,
/// `transition(prev, t)` scores moving from `prev` (or `START`) to `t`. Disallowed BIO
/// transitions are never taken.
fn viterbi<E, T>(len: usize, emission: E, transition: T) -> Vec<usize>
where
    E: Fn(usize, usize) -> f64,
    T: Fn(usize, usize) -> f64,
{
    if len == 0 {
        return Vec::new();
    }
    let tags = Tag::all();
    let allowed = |prev: usize, next: usize| -> bool {
        let prev_tag = if prev == START { None } else { Some(tags[prev]) };
        Tag::can_follow(prev_tag, tags[next])
    };

    let mut score = vec![vec![f64::NEG_INFINITY; TAG_COUNT]; len];
    let mut back = vec![vec![0usize; TAG_COUNT]; len];

    for t in 0..TAG_COUNT {
        if allowed(START, t) {
            score[0][t] = transition(START, t) + emission(0, t);
        }
    }
    for i in 1..len {
        for t in 0..TAG_COUNT {
            let emit = emission(i, t);
            for p in 0..TAG_COUNT {
                if score[i - 1][p] == f64::NEG_INFINITY || !allowed(p, t) {
                    continue;
                }
                let candidate = score[i - 1][p] + transition(p, t) + emit;
                if candidate > score[i][t] {
                    score[i][t] = candidate;
                    back[i][t] = p;
                }
            }
        }
    }

    let mut best = 0;
    for t in 1..TAG_COUNT {
        if score[len - 1][t] > score[len - 1][best] {
            best = t;
        }
    }
    let mut path = vec![best; len];
    for i in (1..len).rev() {
        path[i - 1] = back[i][path[i]];
    }
    path
}

/// Frozen, averaged weights. This is what gets persisted and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceModel {
    /// Ordered so the serialized bytes, and their checksum, are stable.
    emissions: BTreeMap<String, Vec<f64>>,
    /// `(TAG_COUNT + 1) x TAG_COUNT`; the last row scores the sentence start.
    transitions: Vec<Vec<f64>>,
}

impl SequenceModel {
    pub fn feature_count(&self) -> usize {
        self.emissions.len()
    }

    pub fn decode(&self, features: &[Vec<String>]) -> Vec<Tag> {
        let scores: Vec<Vec<f64>> = features.iter().map(|f| self.emission_scores(f)).collect();
        let tags = Tag::all();
        viterbi(
            features.len(),
            |i, t| scores[i][t],
            |p, t| {
                self.transitions
                    .get(p)
                    .and_then(|row| row.get(t))
                    .copied()
                    .unwrap_or(0.0)
            },
        )
        .into_iter()
        .map(|t| tags[t])
        .collect()
    }

    fn emission_scores(&self, features: &[String]) -> Vec<f64> {
        let mut scores = vec![0.0; TAG_COUNT];
        for feat in features {
            if let Some(row) = self.emissions.get(feat) {
                for (s, w) in scores.iter_mut().zip(row) {
                    *s += w;
                }
            }
        }
        scores
    }
}

#[derive(Debug, Clone)]
struct WeightRow {
    w: Vec<f64>,
    total: Vec<f64>,
    stamp: Vec<u64>,
}

impl WeightRow {
    fn new() -> Self {
        Self {
            w: vec![0.0; TAG_COUNT],
            total: vec![0.0; TAG_COUNT],
            stamp: vec![0; TAG_COUNT],
        }
    }

    fn update(&mut self, tag: usize, delta: f64, step: u64) {
        self.total[tag] += (step - self.stamp[tag]) as f64 * self.w[tag];
        self.stamp[tag] = step;
        self.w[tag] += delta;
    }

    fn averaged(&self, step: u64) -> Vec<f64> {
        if step == 0 {
            return self.w.clone();
        }
        (0..TAG_COUNT)
            .map(|t| (self.total[t] + (step - self.stamp[t]) as f64 * self.w[t]) / step as f64)
            .collect()
    }
}

/// Mutable learner; consumed by `finish` into a `SequenceModel`.
#[derive(Debug, Clone)]
pub struct PerceptronLearner {
    emissions: HashMap<String, WeightRow>,
    transitions: Vec<WeightRow>,
    step: u64,
}

impl Default for PerceptronLearner {
    fn default() -> Self {
        Self::new()
    }
}

impl PerceptronLearner {
    pub fn new() -> Self {
        Self {
            emissions: HashMap::new(),
            transitions: (0..=TAG_COUNT).map(|_| WeightRow::new()).collect(),
            step: 0,
        }
    }

    pub fn predict(&self, features: &[Vec<String>]) -> Vec<usize> {
        let scores: Vec<Vec<f64>> = features
            .iter()
            .map(|feats| {
                let mut s = vec![0.0; TAG_COUNT];
                for f in feats {
                    if let Some(row) = self.emissions.get(f) {
                        for (acc, w) in s.iter_mut().zip(&row.w) {
                            *acc += w;
                        }
                    }
                }
                s
            })
            .collect();
        viterbi(features.len(), |i, t| scores[i][t], |p, t| self.transitions[p].w[t])
    }

    /// One perceptron step on a single sentence. Returns the number of mistagged tokens.
    pub fn learn(&mut self, features: &[Vec<String>], gold: &[Tag]) -> usize {
        self.step += 1;
        if features.is_empty() || features.len() != gold.len() {
            return 0;
        }
        let gold: Vec<usize> = gold.iter().map(Tag::index).collect();
        let guess = self.predict(features);
        let mistakes = gold.iter().zip(&guess).filter(|(g, p)| g != p).count();
        if mistakes == 0 {
            return 0;
        }

        let step = self.step;
        for (i, feats) in features.iter().enumerate() {
            let (g, p) = (gold[i], guess[i]);
            let prev_g = if i == 0 { START } else { gold[i - 1] };
            let prev_p = if i == 0 { START } else { guess[i - 1] };
            if g != p {
                for f in feats {
                    let row = self.emissions.entry(f.clone()).or_insert_with(WeightRow::new);
                    row.update(g, 1.0, step);
                    row.update(p, -1.0, step);
                }
            }
            if g != p || prev_g != prev_p {
                self.transitions[prev_g].update(g, 1.0, step);
                self.transitions[prev_p].update(p, -1.0, step);
            }
        }
        mistakes
    }

    /// Averages the weights and drops features whose averaged row is all zero.
    pub fn finish(self) -> SequenceModel {
        let step = self.step;
        let before = self.emissions.len();
        let emissions: BTreeMap<String, Vec<f64>> = self
            .emissions
            .into_iter()
            .map(|(f, row)| (f, row.averaged(step)))
            .filter(|(_, w)| w.iter().any(|x| *x != 0.0))
            .collect();
        debug!("Averaged {} feature rows, kept {}", before, emissions.len());
        SequenceModel {
            emissions,
            transitions: self.transitions.iter().map(|row| row.averaged(step)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ner::labels::EntityLabel;

    fn feats(words: &[&str]) -> Vec<Vec<String>> {
        words.iter().map(|w| vec!["bias".to_string(), format!("w={}", w)]).collect()
    }

    #[test]
    fn test_untrained_model_predicts_outside() {
        let learner = PerceptronLearner::new();
        let path = learner.predict(&feats(&["block", "5"]));
        assert_eq!(path, vec![Tag::Outside.index(); 2]);
    }

    #[test]
    fn test_learns_a_simple_pattern() {
        let mut learner = PerceptronLearner::new();
        let x = feats(&["block", "5", "hawalli"]);
        let gold = vec![
            Tag::Begin(EntityLabel::Block),
            Tag::Inside(EntityLabel::Block),
            Tag::Begin(EntityLabel::Area),
        ];
        let first = learner.learn(&x, &gold);
        assert!(first > 0);
        for _ in 0..5 {
            learner.learn(&x, &gold);
        }
        assert_eq!(learner.learn(&x, &gold), 0);
        let model = learner.finish();
        assert_eq!(model.decode(&x), gold);
    }

    #[test]
    fn test_decode_never_starts_with_inside() {
        let mut learner = PerceptronLearner::new();
        // Push the "x" feature towards I-STREET only.
        let row = learner.emissions.entry("w=x".to_string()).or_insert_with(WeightRow::new);
        row.update(Tag::Inside(EntityLabel::Street).index(), 10.0, 1);
        learner.step = 1;
        let path = learner.predict(&feats(&["x"]));
        assert_ne!(path[0], Tag::Inside(EntityLabel::Street).index());
    }

    #[test]
    fn test_averaging() {
        let mut row = WeightRow::new();
        row.update(0, 2.0, 1);
        row.update(0, -1.0, 3);
        // w = 2 during steps 1..3, then 1 until step 4
        let avg = row.averaged(4);
        assert!((avg[0] - (2.0 * 2.0 + 1.0 * 1.0) / 4.0).abs() < 1e-9);
    }
}
