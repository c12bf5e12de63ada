//! Maps extracted vendor/subject text to a general-ledger-style category
//! using keyword affinity against a configurable account list.

use serde::{Deserialize, Serialize};

/// One configurable ledger account with the keywords that vote for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerAccount {
    pub name: String,
    pub keywords: Vec<String>,
}

impl LedgerAccount {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Suggest the account whose keywords occur most often in the vendor name
/// and subject. Ties go to the earlier account in the list; no keyword hit
/// means no suggestion.
pub fn suggest_category(
    vendor: Option<&str>,
    subject: &str,
    accounts: &[LedgerAccount],
) -> Option<String> {
    let haystack = format!("{} {}", vendor.unwrap_or(""), subject).to_lowercase();

    let mut best: Option<(&LedgerAccount, usize)> = None;
    for account in accounts {
        let hits = account
            .keywords
            .iter()
            .filter(|k| !k.is_empty() && haystack.contains(&k.to_lowercase()))
            .count();
        if hits > 0 && best.map(|(_, b)| hits > b).unwrap_or(true) {
            best = Some((account, hits));
        }
    }
    best.map(|(account, _)| account.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> Vec<LedgerAccount> {
        vec![
            LedgerAccount::new("Software & SaaS", &["software", "cloud", "hosting", "saas"]),
            LedgerAccount::new("Travel", &["flight", "hotel", "airline"]),
            LedgerAccount::new("Utilities", &["electric", "internet", "telecom"]),
        ]
    }

    #[test]
    fn test_vendor_keyword_match() {
        let category = suggest_category(Some("Acme Cloud Hosting"), "Invoice", &accounts());
        assert_eq!(category.as_deref(), Some("Software & SaaS"));
    }

    #[test]
    fn test_subject_keyword_match() {
        let category = suggest_category(None, "Your hotel booking receipt", &accounts());
        assert_eq!(category.as_deref(), Some("Travel"));
    }

    #[test]
    fn test_most_hits_wins_with_earlier_tiebreak() {
        let category = suggest_category(
            Some("Flight Internet Co"),
            "electric bill",
            &accounts(),
        );
        // Travel gets one hit, Utilities two
        assert_eq!(category.as_deref(), Some("Utilities"));
    }

    #[test]
    fn test_no_hits() {
        assert_eq!(suggest_category(Some("Unrelated"), "hello", &accounts()), None);
        assert_eq!(suggest_category(None, "", &[]), None);
    }
}
