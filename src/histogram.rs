use crate::enums::Orientation;

/// What the histogram panel summarizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HistogramSource {
    /// The current slice of one orientation.
    Slice(Orientation),
    #[default]
    Volume,
}

impl HistogramSource {
    pub fn title(self) -> String {
        match self {
            HistogramSource::Slice(orientation) => format!("{} Histogram", orientation.label()),
            HistogramSource::Volume => "Volume Histogram".to_string(),
        }
    }
}

/// Equal-width intensity histogram, ready for a plotting sink.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    pub title: String,
    pub counts: Vec<usize>,
    /// Lower edge of the first bin.
    pub min: f32,
    /// Upper edge of the last bin, which is closed.
    pub max: f32,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width bins spanning their range.
    ///
    /// A single-valued input is centered in a range of width one.
    pub fn compute(title: impl Into<String>, values: impl IntoIterator<Item = f32>, bins: usize) -> Self {
        let values: Vec<f32> = values.into_iter().filter(|v| v.is_finite()).collect();
        let bins = bins.max(1);
        let mut counts = vec![0; bins];
        let title = title.into();

        let Some((mut min, mut max)) = values.iter().fold(None, |range, &v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f32::min(lo, v), f32::max(hi, v))),
        }) else {
            return Self {
                title,
                counts,
                min: 0.0,
                max: 0.0,
            };
        };
        if min == max {
            min -= 0.5;
            max += 0.5;
        }

        let width = (max - min) as f64 / bins as f64;
        for value in values {
            let bin = (((value - min) as f64 / width) as usize).min(bins - 1);
            counts[bin] += 1;
        }
        Self {
            title,
            counts,
            min,
            max,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}
