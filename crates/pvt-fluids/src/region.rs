//! Cell-to-region resolution.

/// Resolves the PVT region of each cell.
///
/// Without a map every cell belongs to region 0. A map shorter than the cell
/// range also resolves the missing cells to region 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegionSelector<'a> {
    map: Option<&'a [usize]>,
}

impl<'a> RegionSelector<'a> {
    /// All cells in region 0.
    pub fn single() -> Self {
        Self { map: None }
    }

    /// Per-cell region indices.
    pub fn from_map(map: &'a [usize]) -> Self {
        Self { map: Some(map) }
    }

    #[inline]
    pub fn region(&self, cell: usize) -> usize {
        match self.map {
            Some(map) => map.get(cell).copied().unwrap_or(0),
            None => 0,
        }
    }

    pub fn is_single(&self) -> bool {
        self.map.is_none()
    }
}

impl<'a> From<Option<&'a [usize]>> for RegionSelector<'a> {
    fn from(map: Option<&'a [usize]>) -> Self {
        Self { map }
    }
}

impl<'a> From<&'a [usize]> for RegionSelector<'a> {
    fn from(map: &'a [usize]) -> Self {
        Self::from_map(map)
    }
}
