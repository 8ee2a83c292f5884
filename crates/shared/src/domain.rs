use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(InfographicId);

/// Display style token shown on a record's category badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    pub label: &'static str,
    pub token: &'static str,
}

pub const CATEGORY_STYLES: [CategoryStyle; 5] = [
    CategoryStyle {
        label: "Gray (default)",
        token: "bg-gray-200 text-gray-800",
    },
    CategoryStyle {
        label: "Blue (technology)",
        token: "bg-blue-200 text-blue-800",
    },
    CategoryStyle {
        label: "Green (announcements)",
        token: "bg-green-200 text-green-800",
    },
    CategoryStyle {
        label: "Yellow (caution)",
        token: "bg-yellow-200 text-yellow-800",
    },
    CategoryStyle {
        label: "Red (important)",
        token: "bg-red-200 text-red-800",
    },
];

impl CategoryStyle {
    pub fn default_style() -> Self {
        CATEGORY_STYLES[0]
    }

    pub fn from_token(token: &str) -> Option<Self> {
        CATEGORY_STYLES
            .iter()
            .copied()
            .find(|style| style.token == token)
    }
}

impl Default for CategoryStyle {
    fn default() -> Self {
        Self::default_style()
    }
}
