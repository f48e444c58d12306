pub mod errors;

pub use errors::{LweError, LweErrorCategory, LweErrorKind, LweResult};

use std::fmt::{Display, Formatter};

/// The two binary payloads written next to every manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Field,
    Spectrum,
}

impl DataKind {
    pub const ALL: [DataKind; 2] = [DataKind::Field, DataKind::Spectrum];

    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Field => "_Ext.dat",
            Self::Spectrum => "_spectrum.dat",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Spectrum => "spectrum",
        }
    }

    pub fn entry_name(self, base: &str) -> String {
        format!("{base}{}", self.suffix())
    }
}

impl Display for DataKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Directory,
    Archive,
}

impl SourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::Archive => "archive",
        }
    }
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Transverse grid of a run: one spatial dimension, or two for the
/// volumetric symmetry modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridLayout {
    Planar { ntime: usize, nspace: usize },
    Volumetric {
        ntime: usize,
        nspace: usize,
        nspace2: usize,
    },
}

impl GridLayout {
    pub const fn ntime(&self) -> usize {
        match *self {
            Self::Planar { ntime, .. } | Self::Volumetric { ntime, .. } => ntime,
        }
    }

    pub const fn nspace(&self) -> usize {
        match *self {
            Self::Planar { nspace, .. } | Self::Volumetric { nspace, .. } => nspace,
        }
    }

    pub const fn nspace2(&self) -> usize {
        match *self {
            Self::Planar { .. } => 1,
            Self::Volumetric { nspace2, .. } => nspace2,
        }
    }

    /// Leading (non-batch) extents of one polarization channel.
    pub fn spatial_shape(&self) -> Vec<usize> {
        match *self {
            Self::Planar { ntime, nspace } => vec![ntime, nspace],
            Self::Volumetric {
                ntime,
                nspace,
                nspace2,
            } => vec![ntime, nspace, nspace2],
        }
    }

    /// Spatio-temporal sample count, or `None` when it overflows `usize`.
    pub const fn ngrid(&self) -> Option<usize> {
        match self.ntime().checked_mul(self.nspace()) {
            Some(count) => count.checked_mul(self.nspace2()),
            None => None,
        }
    }

    pub const fn is_volumetric(&self) -> bool {
        matches!(self, Self::Volumetric { .. })
    }
}

pub const fn is_volumetric_symmetry(symmetry_type: i64) -> bool {
    matches!(symmetry_type, 2 | 4)
}

#[cfg(test)]
mod tests {
    use super::{DataKind, GridLayout, is_volumetric_symmetry};

    #[test]
    fn data_kinds_follow_sibling_naming() {
        assert_eq!(DataKind::Field.entry_name("scan0003"), "scan0003_Ext.dat");
        assert_eq!(
            DataKind::Spectrum.entry_name("scan0003"),
            "scan0003_spectrum.dat"
        );
        assert_eq!(DataKind::Spectrum.to_string(), "spectrum");
    }

    #[test]
    fn layout_reports_spatial_extents() {
        let planar = GridLayout::Planar {
            ntime: 96,
            nspace: 16,
        };
        assert_eq!(planar.nspace2(), 1);
        assert_eq!(planar.spatial_shape(), vec![96, 16]);
        assert_eq!(planar.ngrid(), Some(96 * 16));

        let volumetric = GridLayout::Volumetric {
            ntime: 8,
            nspace: 16,
            nspace2: 24,
        };
        assert!(volumetric.is_volumetric());
        assert_eq!(volumetric.spatial_shape(), vec![8, 16, 24]);
        assert_eq!(volumetric.ngrid(), Some(8 * 16 * 24));
    }

    #[test]
    fn only_modes_two_and_four_are_volumetric() {
        let volumetric = (0..6)
            .filter(|mode| is_volumetric_symmetry(*mode))
            .collect::<Vec<_>>();
        assert_eq!(volumetric, vec![2, 4]);
    }
}
