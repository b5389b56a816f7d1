//! Canonical header order.

/// Preferred column order shared by every exported dataset.
pub const CANONICAL_HEADERS: &[&str] = &[
    "movie_name",
    "movie_date",
    "movie_rating",
    "movie_genre",
    "director",
    "writer",
    "actor",
    "award_year",
    "person_name",
    "person_dateofbirth",
];

/// Priority list used to order columns and to fold plural header variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOrder {
    names: Vec<String>,
}

impl Default for HeaderOrder {
    fn default() -> Self {
        Self::canonical()
    }
}

impl HeaderOrder {
    pub fn canonical() -> Self {
        Self::new(CANONICAL_HEADERS.iter().map(|name| (*name).to_string()))
    }

    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|known| known == name)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Sorts names by list position; unknown names go last in their original order.
    pub fn sort<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        let mut ordered: Vec<(usize, usize, &str)> = names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let name = name.as_ref();
                (self.position(name).unwrap_or(usize::MAX), index, name)
            })
            .collect();
        ordered.sort_by_key(|(rank, index, _)| (*rank, *index));
        ordered
            .into_iter()
            .map(|(_, _, name)| name.to_string())
            .collect()
    }

    /// Strips one trailing character when the remainder is a known header
    /// (`writers` becomes `writer`).
    pub fn singularize(&self, name: &str) -> String {
        let mut chars = name.chars();
        if chars.next_back().is_some() {
            let stem = chars.as_str();
            if self.is_known(stem) {
                return stem.to_string();
            }
        }
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_sort_before_unknown() {
        let order = HeaderOrder::canonical();
        let sorted = order.sort(&["zeta", "director", "alpha", "movie_name"]);
        assert_eq!(sorted, vec!["movie_name", "director", "zeta", "alpha"]);
    }

    #[test]
    fn singularize_folds_plurals_of_known_names() {
        let order = HeaderOrder::canonical();
        assert_eq!(order.singularize("writers"), "writer");
        assert_eq!(order.singularize("actors"), "actor");
        assert_eq!(order.singularize("movie_date"), "movie_date");
        assert_eq!(order.singularize("movie_budget"), "movie_budget");
        assert_eq!(order.singularize(""), "");
    }
}
