//! Dense histograms in one, two, and three dimensions.
//!
//! The model-evaluation engine hands back a full-dimensional histogram whose
//! dimensionality is resolved once, at ingestion, into the tagged
//! [`Histogram`] variant. Each variant carries its own projection capability,
//! so downstream code never re-inspects runtime types.
//!
//! Bin contents are `f64` event weights. Fills outside the axis range are
//! dropped, so `integral()` sums in-range bins only and projections preserve
//! the total integral exactly.

use serde::{Deserialize, Serialize};

use crate::error::PlotError;
use crate::hist::BinAxis;

/// A 1-dimensional histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist1D {
    name: String,
    axis: BinAxis,
    counts: Vec<f64>,
}

impl Hist1D {
    pub fn new(name: impl Into<String>, axis: BinAxis) -> Self {
        let counts = vec![0.0; axis.bins()];
        Self {
            name: name.into(),
            axis,
            counts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn axis(&self) -> &BinAxis {
        &self.axis
    }

    pub fn bin(&self, i: usize) -> f64 {
        self.counts[i]
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Add one entry at `value` with unit weight.
    pub fn fill(&mut self, value: f64) {
        self.fill_weighted(value, 1.0);
    }

    pub fn fill_weighted(&mut self, value: f64, weight: f64) {
        if let Some(i) = self.axis.index_of(value) {
            self.counts[i] += weight;
        }
    }

    /// Sum of all in-range bin contents.
    pub fn integral(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Multiply every bin by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for c in &mut self.counts {
            *c *= factor;
        }
    }

    /// Bin-wise addition. Binning must match exactly.
    pub fn add(&mut self, other: &Hist1D) -> Result<(), PlotError> {
        if self.axis != other.axis {
            return Err(PlotError::config(format!(
                "binning mismatch adding histogram '{}' into '{}'",
                other.name, self.name
            )));
        }
        for (a, b) in self.counts.iter_mut().zip(other.counts.iter()) {
            *a += b;
        }
        Ok(())
    }

    /// An empty histogram with identical binning.
    pub fn zeroed_like(&self, name: impl Into<String>) -> Hist1D {
        Hist1D::new(name, self.axis.clone())
    }
}

/// A 2-dimensional histogram, bins stored row-major (x fastest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist2D {
    name: String,
    x_axis: BinAxis,
    y_axis: BinAxis,
    counts: Vec<f64>,
}

impl Hist2D {
    pub fn new(name: impl Into<String>, x_axis: BinAxis, y_axis: BinAxis) -> Self {
        let counts = vec![0.0; x_axis.bins() * y_axis.bins()];
        Self {
            name: name.into(),
            x_axis,
            y_axis,
            counts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn x_axis(&self) -> &BinAxis {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &BinAxis {
        &self.y_axis
    }

    pub fn bin(&self, ix: usize, iy: usize) -> f64 {
        self.counts[iy * self.x_axis.bins() + ix]
    }

    pub fn fill(&mut self, x: f64, y: f64) {
        self.fill_weighted(x, y, 1.0);
    }

    pub fn fill_weighted(&mut self, x: f64, y: f64, weight: f64) {
        if let (Some(ix), Some(iy)) = (self.x_axis.index_of(x), self.y_axis.index_of(y)) {
            self.counts[iy * self.x_axis.bins() + ix] += weight;
        }
    }

    pub fn integral(&self) -> f64 {
        self.counts.iter().sum()
    }

    pub fn scale(&mut self, factor: f64) {
        for c in &mut self.counts {
            *c *= factor;
        }
    }

    pub fn add(&mut self, other: &Hist2D) -> Result<(), PlotError> {
        if self.x_axis != other.x_axis || self.y_axis != other.y_axis {
            return Err(PlotError::config(format!(
                "binning mismatch adding histogram '{}' into '{}'",
                other.name, self.name
            )));
        }
        for (a, b) in self.counts.iter_mut().zip(other.counts.iter()) {
            *a += b;
        }
        Ok(())
    }

    /// Marginal along x (summed over y).
    pub fn project_x(&self, name: impl Into<String>) -> Hist1D {
        let mut out = Hist1D::new(name, self.x_axis.clone());
        for iy in 0..self.y_axis.bins() {
            for ix in 0..self.x_axis.bins() {
                out.counts[ix] += self.bin(ix, iy);
            }
        }
        out
    }

    /// Marginal along y (summed over x).
    pub fn project_y(&self, name: impl Into<String>) -> Hist1D {
        let mut out = Hist1D::new(name, self.y_axis.clone());
        for iy in 0..self.y_axis.bins() {
            for ix in 0..self.x_axis.bins() {
                out.counts[iy] += self.bin(ix, iy);
            }
        }
        out
    }
}

/// A 3-dimensional histogram, bins stored with x fastest, then y, then z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist3D {
    name: String,
    x_axis: BinAxis,
    y_axis: BinAxis,
    z_axis: BinAxis,
    counts: Vec<f64>,
}

impl Hist3D {
    pub fn new(name: impl Into<String>, x_axis: BinAxis, y_axis: BinAxis, z_axis: BinAxis) -> Self {
        let counts = vec![0.0; x_axis.bins() * y_axis.bins() * z_axis.bins()];
        Self {
            name: name.into(),
            x_axis,
            y_axis,
            z_axis,
            counts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn x_axis(&self) -> &BinAxis {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &BinAxis {
        &self.y_axis
    }

    pub fn z_axis(&self) -> &BinAxis {
        &self.z_axis
    }

    fn offset(&self, ix: usize, iy: usize, iz: usize) -> usize {
        (iz * self.y_axis.bins() + iy) * self.x_axis.bins() + ix
    }

    pub fn bin(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        self.counts[self.offset(ix, iy, iz)]
    }

    pub fn fill(&mut self, x: f64, y: f64, z: f64) {
        self.fill_weighted(x, y, z, 1.0);
    }

    pub fn fill_weighted(&mut self, x: f64, y: f64, z: f64, weight: f64) {
        if let (Some(ix), Some(iy), Some(iz)) = (
            self.x_axis.index_of(x),
            self.y_axis.index_of(y),
            self.z_axis.index_of(z),
        ) {
            let off = self.offset(ix, iy, iz);
            self.counts[off] += weight;
        }
    }

    pub fn integral(&self) -> f64 {
        self.counts.iter().sum()
    }

    pub fn scale(&mut self, factor: f64) {
        for c in &mut self.counts {
            *c *= factor;
        }
    }

    pub fn add(&mut self, other: &Hist3D) -> Result<(), PlotError> {
        if self.x_axis != other.x_axis
            || self.y_axis != other.y_axis
            || self.z_axis != other.z_axis
        {
            return Err(PlotError::config(format!(
                "binning mismatch adding histogram '{}' into '{}'",
                other.name, self.name
            )));
        }
        for (a, b) in self.counts.iter_mut().zip(other.counts.iter()) {
            *a += b;
        }
        Ok(())
    }

    pub fn project_x(&self, name: impl Into<String>) -> Hist1D {
        let mut out = Hist1D::new(name, self.x_axis.clone());
        self.project_into(|ix, _, _| ix, &mut out);
        out
    }

    pub fn project_y(&self, name: impl Into<String>) -> Hist1D {
        let mut out = Hist1D::new(name, self.y_axis.clone());
        self.project_into(|_, iy, _| iy, &mut out);
        out
    }

    pub fn project_z(&self, name: impl Into<String>) -> Hist1D {
        let mut out = Hist1D::new(name, self.z_axis.clone());
        self.project_into(|_, _, iz| iz, &mut out);
        out
    }

    fn project_into(&self, pick: impl Fn(usize, usize, usize) -> usize, out: &mut Hist1D) {
        for iz in 0..self.z_axis.bins() {
            for iy in 0..self.y_axis.bins() {
                for ix in 0..self.x_axis.bins() {
                    out.counts[pick(ix, iy, iz)] += self.bin(ix, iy, iz);
                }
            }
        }
    }
}

/// A full-dimensional model histogram.
///
/// Dimensionality is fixed by the variant; anything beyond three dimensions
/// is unrepresentable, so "unsupported observable dimensionality" surfaces at
/// histogram construction rather than deep in the plot loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Histogram {
    Dim1(Hist1D),
    Dim2(Hist2D),
    Dim3(Hist3D),
}

impl Histogram {
    pub fn dim(&self) -> usize {
        match self {
            Histogram::Dim1(_) => 1,
            Histogram::Dim2(_) => 2,
            Histogram::Dim3(_) => 3,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Histogram::Dim1(h) => h.name(),
            Histogram::Dim2(h) => h.name(),
            Histogram::Dim3(h) => h.name(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        match self {
            Histogram::Dim1(h) => h.set_name(name),
            Histogram::Dim2(h) => h.set_name(name),
            Histogram::Dim3(h) => h.set_name(name),
        }
    }

    pub fn integral(&self) -> f64 {
        match self {
            Histogram::Dim1(h) => h.integral(),
            Histogram::Dim2(h) => h.integral(),
            Histogram::Dim3(h) => h.integral(),
        }
    }

    pub fn scale(&mut self, factor: f64) {
        match self {
            Histogram::Dim1(h) => h.scale(factor),
            Histogram::Dim2(h) => h.scale(factor),
            Histogram::Dim3(h) => h.scale(factor),
        }
    }

    /// Bin-wise addition. Both histograms must have the same dimensionality
    /// and identical binning.
    pub fn add(&mut self, other: &Histogram) -> Result<(), PlotError> {
        match (self, other) {
            (Histogram::Dim1(a), Histogram::Dim1(b)) => a.add(b),
            (Histogram::Dim2(a), Histogram::Dim2(b)) => a.add(b),
            (Histogram::Dim3(a), Histogram::Dim3(b)) => a.add(b),
            (a, b) => Err(PlotError::dimensionality(format!(
                "cannot add {}-dimensional histogram '{}' into {}-dimensional '{}'",
                b.dim(),
                b.name(),
                a.dim(),
                a.name()
            ))),
        }
    }

    /// One marginal per axis, in axis order (x, y, z).
    ///
    /// Marginal names are derived from the parent name with an axis suffix.
    pub fn project(&self) -> Vec<Hist1D> {
        match self {
            Histogram::Dim1(h) => {
                let mut only = h.clone();
                only.set_name(format!("{}_x", h.name()));
                vec![only]
            }
            Histogram::Dim2(h) => vec![
                h.project_x(format!("{}_x", h.name())),
                h.project_y(format!("{}_y", h.name())),
            ],
            Histogram::Dim3(h) => vec![
                h.project_x(format!("{}_x", h.name())),
                h.project_y(format!("{}_y", h.name())),
                h.project_z(format!("{}_z", h.name())),
            ],
        }
    }
}
