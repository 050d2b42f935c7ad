use super::kind::AggKind;

/// Running state for one field within one window.
///
/// `absorb` sees every numeric value of the field, `NaN` included; each
/// implementation skips `NaN` so it never reaches the result.
pub trait Accumulator {
    fn absorb(&mut self, value: f64);
    fn finalize(&self) -> f64;
}

/// Build a fresh accumulator for `kind`.
pub fn new_accumulator(kind: AggKind) -> Box<dyn Accumulator> {
    match kind {
        AggKind::Sum => Box::new(Sum::default()),
        AggKind::Min => Box::new(Min::default()),
        AggKind::Max => Box::new(Max::default()),
        AggKind::Mean => Box::new(Mean::default()),
        AggKind::Count => Box::new(Count::default()),
    }
}

#[derive(Debug, Default)]
struct Sum {
    total: f64,
}

impl Accumulator for Sum {
    fn absorb(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.total += value;
    }

    fn finalize(&self) -> f64 {
        self.total
    }
}

// Extrema start from 0, so an all-negative max (or all-positive min) reports 0.
#[derive(Debug, Default)]
struct Max {
    max: f64,
}

impl Accumulator for Max {
    fn absorb(&mut self, value: f64) {
        if value > self.max {
            self.max = value;
        }
    }

    fn finalize(&self) -> f64 {
        self.max
    }
}

#[derive(Debug, Default)]
struct Min {
    min: f64,
}

impl Accumulator for Min {
    fn absorb(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
    }

    fn finalize(&self) -> f64 {
        self.min
    }
}

#[derive(Debug, Default)]
struct Count {
    n: u64,
}

impl Accumulator for Count {
    fn absorb(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.n += 1;
    }

    fn finalize(&self) -> f64 {
        self.n as f64
    }
}

#[derive(Debug, Default)]
struct Mean {
    total: f64,
    n: u64,
}

impl Accumulator for Mean {
    fn absorb(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.total += value;
        self.n += 1;
    }

    /// `NaN` when nothing was absorbed.
    fn finalize(&self) -> f64 {
        self.total / self.n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(kind: AggKind, values: &[f64]) -> f64 {
        let mut acc = new_accumulator(kind);
        for v in values {
            acc.absorb(*v);
        }
        acc.finalize()
    }

    #[test]
    fn sum_skips_nan() {
        assert_eq!(run(AggKind::Sum, &[1.0, f64::NAN, 2.5]), 3.5);
    }

    #[test]
    fn count_skips_nan() {
        assert_eq!(run(AggKind::Count, &[1.0, f64::NAN, 2.5, 0.0]), 3.0);
    }

    #[test]
    fn mean_excludes_nan_from_both_sides() {
        assert_eq!(run(AggKind::Mean, &[1.0, f64::NAN, 3.0]), 2.0);
        assert!(run(AggKind::Mean, &[f64::NAN]).is_nan());
    }

    #[test]
    fn extrema_start_at_zero() {
        assert_eq!(run(AggKind::Max, &[3.0, 7.0, 5.0]), 7.0);
        assert_eq!(run(AggKind::Max, &[-3.0, -7.0]), 0.0);
        assert_eq!(run(AggKind::Min, &[-3.0, -7.0]), -7.0);
        assert_eq!(run(AggKind::Min, &[3.0, 7.0]), 0.0);
        assert_eq!(run(AggKind::Max, &[f64::NAN, 4.0]), 4.0);
    }

    #[test]
    fn single_value_round_trips() {
        for kind in [AggKind::Sum, AggKind::Max, AggKind::Mean] {
            assert_eq!(run(kind, &[42.0]), 42.0, "{kind}");
        }
    }
}
