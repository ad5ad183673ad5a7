//! Dotted API version ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Numeric dotted version such as `5.5` or `6.7.1`.
///
/// Missing trailing components compare as zero, so `6.0` equals `6.0.0`.
#[derive(Debug, Clone)]
pub struct Version(Vec<u32>);

impl Version {
	pub fn components(&self) -> &[u32] {
		&self.0
	}

	/// Returns `true` when `self <= other`.
	pub fn lte(&self, other: &Version) -> bool {
		self <= other
	}
}

impl FromStr for Version {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		if trimmed.is_empty() {
			return Err(Error::InvalidVersion(s.to_string()));
		}
		trimmed
			.split('.')
			.map(|part| part.parse::<u32>().map_err(|_| Error::InvalidVersion(s.to_string())))
			.collect::<Result<Vec<_>, _>>()
			.map(Version)
	}
}

impl Ord for Version {
	fn cmp(&self, other: &Self) -> Ordering {
		let len = self.0.len().max(other.0.len());
		(0..len)
			.map(|i| {
				let a = self.0.get(i).copied().unwrap_or(0);
				let b = other.0.get(i).copied().unwrap_or(0);
				a.cmp(&b)
			})
			.find(|ord| *ord != Ordering::Equal)
			.unwrap_or(Ordering::Equal)
	}
}

impl PartialOrd for Version {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl PartialEq for Version {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for Version {}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
		f.write_str(&parts.join("."))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn v(s: &str) -> Version {
		s.parse().unwrap()
	}

	#[test]
	fn orders_numerically_not_lexically() {
		assert!(v("5.5") < v("6.0"));
		assert!(v("6.0") < v("6.10"));
		assert!(v("5.5").lte(&v("5.5")));
		assert!(!v("6.0").lte(&v("5.5")));
	}

	#[test]
	fn missing_components_are_zero() {
		assert_eq!(v("6.0"), v("6.0.0"));
		assert!(v("6.0") < v("6.0.1"));
	}

	#[test]
	fn rejects_non_numeric_components() {
		assert!("6.5.x".parse::<Version>().is_err());
		assert!("".parse::<Version>().is_err());
		assert!("6..0".parse::<Version>().is_err());
	}

	#[test]
	fn displays_components() {
		assert_eq!(v("6.7.1").to_string(), "6.7.1");
	}
}
