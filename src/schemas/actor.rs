//! Actor schema - Caller identity as resolved by the external identity layer

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A disputant (Party A or Party B)
    Party,
    Panelist,
    Admin,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "party" => Ok(Role::Party),
            "panelist" => Ok(Role::Panelist),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Party => write!(f, "party"),
            Role::Panelist => write!(f, "panelist"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// The authenticated caller of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Actor { id: id.into(), role }
    }

    pub fn party(id: impl Into<String>) -> Self {
        Actor::new(id, Role::Party)
    }

    pub fn panelist(id: impl Into<String>) -> Self {
        Actor::new(id, Role::Panelist)
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Actor::new(id, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
