//! Resolution of the `(commit, tag, branch)` inputs into a single checkout
//! target.
//!
//! Precedence is commit, then tag, then branch. Lower-precedence values that
//! accompany a higher one are context, not conflicts: a commit with a branch
//! still checks out the commit, while the branch decides what gets fetched.

use serde::Serialize;
use std::fmt;

/// What kind of ref a checkout points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    Commit,
    Tag,
    Branch,
    None,
}

impl fmt::Display for CheckoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutMode::Commit => "commit",
            CheckoutMode::Tag => "tag",
            CheckoutMode::Branch => "branch",
            CheckoutMode::None => "none",
        };
        f.write_str(name)
    }
}

/// The single ref a non-PR build checks out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutTarget {
    pub mode: CheckoutMode,
    pub r#ref: String,
}

impl CheckoutTarget {
    /// A target that performs no checkout.
    pub fn none() -> Self {
        Self {
            mode: CheckoutMode::None,
            r#ref: String::new(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.mode == CheckoutMode::None
    }
}

/// Picks the checkout target by precedence: commit, tag, branch.
pub fn resolve(commit: &str, tag: &str, branch: &str) -> CheckoutTarget {
    let (mode, r#ref) = if !commit.is_empty() {
        (CheckoutMode::Commit, commit)
    } else if !tag.is_empty() {
        (CheckoutMode::Tag, tag)
    } else if !branch.is_empty() {
        (CheckoutMode::Branch, branch)
    } else {
        return CheckoutTarget::none();
    };

    CheckoutTarget {
        mode,
        r#ref: r#ref.to_string(),
    }
}
