use time::OffsetDateTime;

use super::error::DomainError;

const MAX_ITEM_NAME_CHARS: usize = 120;

/// Inventory entry. The inventory exists to give the toast and confirmation
/// surfaces something real to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: u32,
    pub name: ItemName,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemName(String);

impl ItemName {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("item name must not be empty"));
        }
        if trimmed.chars().count() > MAX_ITEM_NAME_CHARS {
            return Err(DomainError::validation(format!(
                "item name must not exceed {MAX_ITEM_NAME_CHARS} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed() {
        let name = ItemName::parse("  Ledger  ").expect("valid name");
        assert_eq!(name.as_str(), "Ledger");
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(ItemName::parse("   ").is_err());
    }

    #[test]
    fn oversized_name_is_rejected() {
        let raw = "x".repeat(MAX_ITEM_NAME_CHARS + 1);
        assert!(ItemName::parse(&raw).is_err());
    }
}
