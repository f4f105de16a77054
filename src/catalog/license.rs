//! License sets and the per-item license filter
//!
//! Three sets matter for a run: the universe of license ids the catalog
//! knows about, the ids the user included (everything by default) and the
//! ids the user excluded (nothing by default). The allow-set is
//! `include - exclude` and is fixed before any crawl begins.

use crate::catalog::types::License;
use crate::ConfigError;
use std::collections::BTreeSet;
use std::fmt;

/// A set of license ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseSet(BTreeSet<String>);

impl LicenseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated id list such as `"1,2, 4"`
    ///
    /// Blank entries are ignored.
    pub fn parse_list(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// The set of ids present in a license table
    pub fn from_table(table: &[License]) -> Self {
        table.iter().map(|l| l.id.clone()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Ids in `self` that are not in `other`
    pub fn difference(&self, other: &LicenseSet) -> LicenseSet {
        self.0.difference(&other.0).cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for LicenseSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for LicenseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.iter().collect();
        write!(f, "{}", ids.join(","))
    }
}

/// The effective license filter for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicensePolicy {
    allowed: LicenseSet,
}

impl LicensePolicy {
    /// Builds the allow-set from the configured filters
    ///
    /// # Arguments
    ///
    /// * `universe` - Every license id the catalog knows
    /// * `include` - Ids to keep; `None` means the whole universe
    /// * `exclude` - Ids to drop
    ///
    /// # Returns
    ///
    /// * `Ok(LicensePolicy)` - The filters are valid
    /// * `Err(ConfigError)` - A filter names an unknown id, or nothing is left
    pub fn build(
        universe: &LicenseSet,
        include: Option<&LicenseSet>,
        exclude: &LicenseSet,
    ) -> Result<Self, ConfigError> {
        let include = include.unwrap_or(universe);

        check_subset("include", include, universe)?;
        check_subset("exclude", exclude, universe)?;

        let allowed = include.difference(exclude);
        if allowed.is_empty() {
            return Err(ConfigError::EmptyLicenseSet);
        }

        Ok(Self { allowed })
    }

    /// A policy that lets every item through
    pub fn allow_all(universe: &LicenseSet) -> Self {
        Self {
            allowed: universe.clone(),
        }
    }

    /// Returns true if an item carrying `license` may be downloaded
    ///
    /// Items without a license id are always allowed.
    pub fn allows(&self, license: Option<&str>) -> bool {
        match license {
            None => true,
            Some(id) => self.allowed.contains(id),
        }
    }

    pub fn allowed(&self) -> &LicenseSet {
        &self.allowed
    }
}

fn check_subset(
    filter: &'static str,
    set: &LicenseSet,
    universe: &LicenseSet,
) -> Result<(), ConfigError> {
    let unknown = set.difference(universe);
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::UnknownLicense {
            filter,
            ids: unknown.to_string(),
        })
    }
}

/// License table used when the catalog lookup fails
pub fn fallback_license_table() -> Vec<License> {
    const TABLE: &[(&str, &str, &str)] = &[
        ("0", "All Rights Reserved", ""),
        (
            "1",
            "Attribution-NonCommercial-ShareAlike License",
            "https://creativecommons.org/licenses/by-nc-sa/2.0/",
        ),
        (
            "2",
            "Attribution-NonCommercial License",
            "https://creativecommons.org/licenses/by-nc/2.0/",
        ),
        (
            "3",
            "Attribution-NonCommercial-NoDerivs License",
            "https://creativecommons.org/licenses/by-nc-nd/2.0/",
        ),
        (
            "4",
            "Attribution License",
            "https://creativecommons.org/licenses/by/2.0/",
        ),
        (
            "5",
            "Attribution-ShareAlike License",
            "https://creativecommons.org/licenses/by-sa/2.0/",
        ),
        (
            "6",
            "Attribution-NoDerivs License",
            "https://creativecommons.org/licenses/by-nd/2.0/",
        ),
        (
            "7",
            "No known copyright restrictions",
            "https://www.flickr.com/commons/usage/",
        ),
        (
            "8",
            "United States Government Work",
            "http://www.usa.gov/copyright.shtml",
        ),
        (
            "9",
            "Public Domain Dedication (CC0)",
            "https://creativecommons.org/publicdomain/zero/1.0/",
        ),
        (
            "10",
            "Public Domain Mark",
            "https://creativecommons.org/publicdomain/mark/1.0/",
        ),
    ];

    TABLE
        .iter()
        .map(|(id, name, url)| License {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
        })
        .collect()
}
