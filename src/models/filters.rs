/// Number of doctors shown per list page.
pub const DOCTOR_PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, Default)]
pub struct DoctorFilter {
    /// Case-sensitive substring matched against the national ID.
    pub id_contains: Option<String>,
    /// 1-indexed page number. Values below 1 are treated as 1.
    pub page: u32,
}

impl DoctorFilter {
    pub fn new(search: Option<String>, page: Option<u32>) -> Self {
        Self {
            id_contains: search.filter(|s| !s.is_empty()),
            page: page.unwrap_or(1).max(1),
        }
    }

    pub fn offset(&self) -> u32 {
        (self.page.max(1) - 1).saturating_mul(DOCTOR_PAGE_SIZE)
    }
}

/// Pages needed to show `total` rows, rounding up.
pub fn total_pages(total: u32) -> u32 {
    total.div_ceil(DOCTOR_PAGE_SIZE)
}
