//! Histogram filling: the write-only sink that the analysis reports to, and an
//! in-memory registry of binned histograms implementing it

use crate::numeric::Float;

use std::collections::BTreeMap;

/// Destination of histogram fills
///
/// The analysis never reads histogram state back, so this is all it needs to
/// know about where its observables end up.
///
pub trait HistogramSink {
    /// Fill the named histogram at some coordinates with some weight
    fn fill_weighted(&mut self, name: &str, coords: &[Float], weight: Float);

    /// Fill a 1D histogram with unit weight
    fn fill(&mut self, name: &str, x: Float) {
        self.fill_weighted(name, &[x], 1.)
    }

    /// Fill a 2D histogram with unit weight
    fn fill_2d(&mut self, name: &str, x: Float, y: Float) {
        self.fill_weighted(name, &[x, y], 1.)
    }
}

/// Binning along one histogram axis
#[derive(Clone, Debug, PartialEq)]
pub enum Axis {
    /// Equal-width bins between two bounds
    Uniform { bins: usize, min: Float, max: Float },

    /// Bins delimited by an increasing list of edges
    Variable(Vec<Float>),
}
//
impl Axis {
    /// Equal-width binning
    pub fn uniform(bins: usize, min: Float, max: Float) -> Self {
        assert!(bins > 0, "An axis needs at least one bin");
        assert!(max > min, "Axis bounds must be increasing");
        Self::Uniform { bins, min, max }
    }

    /// Variable-width binning
    pub fn variable(edges: &[Float]) -> Self {
        assert!(edges.len() >= 2, "An axis needs at least one bin");
        assert!(
            edges.windows(2).all(|w| w[0] < w[1]),
            "Axis edges must be strictly increasing"
        );
        Self::Variable(edges.to_vec())
    }

    /// Number of in-range bins
    pub fn num_bins(&self) -> usize {
        match self {
            Self::Uniform { bins, .. } => *bins,
            Self::Variable(edges) => edges.len() - 1,
        }
    }

    /// Bin holding a coordinate
    ///
    /// Bin 0 is the underflow and bin `num_bins() + 1` is the overflow. NaN
    /// goes to the underflow.
    ///
    pub fn find_bin(&self, x: Float) -> usize {
        match self {
            Self::Uniform { bins, min, max } => {
                if !(x >= *min) {
                    0
                } else if x >= *max {
                    bins + 1
                } else {
                    let idx = ((x - min) / (max - min) * (*bins as Float)) as usize;
                    1 + idx.min(bins - 1)
                }
            }
            Self::Variable(edges) => {
                if !(x >= edges[0]) {
                    0
                } else {
                    edges.partition_point(|&edge| edge <= x)
                }
            }
        }
    }

    /// Lower edge of an in-range bin (1-based, like find_bin)
    pub fn low_edge(&self, bin: usize) -> Float {
        debug_assert!(bin >= 1 && bin <= self.num_bins());
        match self {
            Self::Uniform { bins, min, max } => {
                min + (max - min) * ((bin - 1) as Float) / (*bins as Float)
            }
            Self::Variable(edges) => edges[bin - 1],
        }
    }
}

/// Binned histogram with one or two axes
///
/// Bin contents are stored sparsely, since most 2D QA maps are large and
/// mostly empty.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    /// Title, ROOT style (";x title;y title;z title")
    title: String,

    /// Binning of each axis
    axes: Vec<Axis>,

    /// Optional labels of the first axis' in-range bins
    labels: Vec<String>,

    /// Sum of weights per global bin index, including under/overflows
    contents: BTreeMap<usize, Float>,

    /// Number of fill calls
    entries: usize,
}
//
impl Histogram {
    /// Create an empty histogram
    pub fn new(title: &str, axes: Vec<Axis>) -> Self {
        assert!(
            (1..=2).contains(&axes.len()),
            "Only 1D and 2D histograms are supported"
        );
        Self {
            title: title.to_owned(),
            axes,
            labels: Vec::new(),
            contents: BTreeMap::new(),
            entries: 0,
        }
    }

    /// Histogram title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Axis binning
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Bin labels of the first axis (empty if unlabeled)
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label the in-range bins of the first axis
    pub fn set_labels(&mut self, labels: &[&str]) {
        assert_eq!(
            labels.len(),
            self.axes[0].num_bins(),
            "There should be one label per bin"
        );
        self.labels = labels.iter().map(|&l| l.to_owned()).collect();
    }

    /// Number of fill calls
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Sum of weights over all bins, under/overflows included
    pub fn sum_of_weights(&self) -> Float {
        self.contents.values().sum()
    }

    /// Content of a bin, given one (under/overflow aware) index per axis
    pub fn bin_content(&self, bins: &[usize]) -> Float {
        self.contents
            .get(&self.global_bin(bins))
            .copied()
            .unwrap_or(0.)
    }

    /// Record a weighted fill
    pub fn fill(&mut self, coords: &[Float], weight: Float) {
        assert_eq!(
            coords.len(),
            self.axes.len(),
            "Fill dimension should match histogram dimension"
        );
        let bins = self
            .axes
            .iter()
            .zip(coords)
            .map(|(axis, &x)| axis.find_bin(x))
            .collect::<Vec<_>>();
        let global = self.global_bin(&bins);
        *self.contents.entry(global).or_insert(0.) += weight;
        self.entries += 1;
    }

    /// Integrate another histogram with identical binning into this one
    pub fn merge(&mut self, other: Histogram) {
        assert_eq!(self.axes, other.axes, "Cannot merge different binnings");
        for (bin, content) in other.contents {
            *self.contents.entry(bin).or_insert(0.) += content;
        }
        self.entries += other.entries;
    }

    /// Iterate over non-empty bins as (per-axis bin indices, content)
    pub fn filled_bins(&self) -> impl Iterator<Item = (Vec<usize>, Float)> + '_ {
        self.contents
            .iter()
            .map(move |(&global, &content)| (self.local_bins(global), content))
    }

    /// Flatten per-axis bin indices into a global bin index
    fn global_bin(&self, bins: &[usize]) -> usize {
        let mut stride = 1;
        let mut global = 0;
        for (axis, &bin) in self.axes.iter().zip(bins) {
            global += bin * stride;
            stride *= axis.num_bins() + 2;
        }
        global
    }

    /// Inverse of global_bin
    fn local_bins(&self, mut global: usize) -> Vec<usize> {
        self.axes
            .iter()
            .map(|axis| {
                let width = axis.num_bins() + 2;
                let bin = global % width;
                global /= width;
                bin
            })
            .collect()
    }
}

/// Registry of named histograms
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Histograms {
    histos: BTreeMap<String, Histogram>,
}
//
impl Histograms {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new histogram
    pub fn add(&mut self, name: impl Into<String>, title: &str, axes: Vec<Axis>) -> &mut Histogram {
        let name = name.into();
        assert!(
            !self.histos.contains_key(&name),
            "Histogram {name} was registered twice"
        );
        self.histos
            .entry(name)
            .or_insert_with(|| Histogram::new(title, axes))
    }

    /// Look up a histogram
    pub fn get(&self, name: &str) -> Option<&Histogram> {
        self.histos.get(name)
    }

    /// Iterate over histograms in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Histogram)> {
        self.histos.iter().map(|(name, histo)| (name.as_str(), histo))
    }

    /// Number of registered histograms
    pub fn len(&self) -> usize {
        self.histos.len()
    }

    /// Integrate the histograms of another registry with the same layout
    pub fn merge(&mut self, other: Histograms) {
        assert_eq!(
            self.histos.len(),
            other.histos.len(),
            "Cannot merge registries with different layouts"
        );
        for (name, histo) in other.histos {
            self.histos
                .get_mut(&name)
                .unwrap_or_else(|| panic!("Histogram {name} is missing from the target"))
                .merge(histo);
        }
    }
}

impl HistogramSink for Histograms {
    fn fill_weighted(&mut self, name: &str, coords: &[Float], weight: Float) {
        self.histos
            .get_mut(name)
            .unwrap_or_else(|| panic!("Histogram {name} was not registered"))
            .fill(coords, weight);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_binning() {
        let axis = Axis::uniform(10, 0., 1.);
        assert_eq!(axis.find_bin(-0.1), 0);
        assert_eq!(axis.find_bin(0.), 1);
        assert_eq!(axis.find_bin(0.05), 1);
        assert_eq!(axis.find_bin(0.15), 2);
        assert_eq!(axis.find_bin(0.999), 10);
        assert_eq!(axis.find_bin(1.), 11);
        assert_eq!(axis.find_bin(Float::NAN), 0);
        assert_eq!(axis.low_edge(1), 0.);
    }

    #[test]
    fn variable_binning() {
        let axis = Axis::variable(&[0., 0.1, 0.5, 2.]);
        assert_eq!(axis.num_bins(), 3);
        assert_eq!(axis.find_bin(-1.), 0);
        assert_eq!(axis.find_bin(0.), 1);
        assert_eq!(axis.find_bin(0.3), 2);
        assert_eq!(axis.find_bin(0.5), 3);
        assert_eq!(axis.find_bin(2.), 4);
        assert_eq!(axis.low_edge(3), 0.5);
    }

    #[test]
    fn fill_and_merge() {
        let mut histos = Histograms::new();
        histos.add("h1", ";x;counts", vec![Axis::uniform(4, 0., 4.)]);
        histos.add(
            "h2",
            ";x;y;counts",
            vec![Axis::uniform(2, 0., 2.), Axis::uniform(3, 0., 3.)],
        );
        let mut other = histos.clone();

        histos.fill("h1", 1.5);
        histos.fill_weighted("h1", &[1.2], 2.);
        histos.fill_2d("h2", 1.5, 2.5);
        other.fill("h1", 3.5);
        other.fill_2d("h2", 1.5, 2.5);
        histos.merge(other);

        let h1 = histos.get("h1").unwrap();
        assert_eq!(h1.entries(), 3);
        assert_eq!(h1.bin_content(&[2]), 3.);
        assert_eq!(h1.bin_content(&[4]), 1.);
        assert_eq!(h1.sum_of_weights(), 4.);

        let h2 = histos.get("h2").unwrap();
        assert_eq!(h2.bin_content(&[2, 3]), 2.);
        assert_eq!(h2.filled_bins().collect::<Vec<_>>(), vec![(vec![2, 3], 2.)]);
    }

    #[test]
    #[should_panic]
    fn unregistered_fill() {
        Histograms::new().fill("nope", 1.);
    }

    #[test]
    #[should_panic]
    fn double_registration() {
        let mut histos = Histograms::new();
        histos.add("h", "", vec![Axis::uniform(1, 0., 1.)]);
        histos.add("h", "", vec![Axis::uniform(1, 0., 1.)]);
    }
}
