use lightning_invoice::{Bolt11Invoice, Bolt11InvoiceDescriptionRef};

pub type InvoiceResult<T, E = InvoiceError> = Result<T, E>;

#[derive(Clone, Debug, thiserror::Error)]
pub enum InvoiceError {
    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    Validation(String),
}

impl InvoiceError {
    pub fn validation(err: &str) -> Self {
        Self::Validation(err.to_string())
    }
}

/// The fields of a BOLT11 invoice the wallet flows care about
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedInvoice {
    pub bolt11: String,
    pub payment_hash: String,
    pub amount_msat: Option<u64>,
    pub description: Option<String>,
    pub expiry: u64,
    pub timestamp: u64,
}

/// Decodes a BOLT11 invoice string, with or without a `lightning:` prefix.
pub fn decode_invoice(input: &str) -> InvoiceResult<DecodedInvoice> {
    let trimmed = input.trim();
    let bolt11 = trimmed
        .get(..10)
        .filter(|prefix| prefix.eq_ignore_ascii_case("lightning:"))
        .map_or(trimmed, |_| &trimmed[10..]);
    if bolt11.is_empty() {
        return Err(InvoiceError::validation("Invoice is empty"));
    }

    let invoice: Bolt11Invoice = bolt11
        .parse()
        .map_err(|e: lightning_invoice::ParseOrSemanticError| InvoiceError::Parse(e.to_string()))?;

    Ok(DecodedInvoice {
        bolt11: bolt11.to_string(),
        payment_hash: invoice.payment_hash().to_string(),
        amount_msat: invoice.amount_milli_satoshis(),
        description: match invoice.description() {
            Bolt11InvoiceDescriptionRef::Direct(description) => Some(description.to_string()),
            Bolt11InvoiceDescriptionRef::Hash(_) => None,
        },
        expiry: invoice.expiry_time().as_secs(),
        timestamp: invoice.duration_since_epoch().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::{InvoiceError, decode_invoice};

    const INVOICE: &str = "lnbc110n1p38q3gtpp5ypz09jrd8p993snjwnm68cph4ftwp22le34xd4r8ftspwshxhmnsdqqxqyjw5qcqpxsp5htlg8ydpywvsa7h3u4hdn77ehs4z4e844em0apjyvmqfkzqhhd2q9qgsqqqyssqszpxzxt9uuqzymr7zxcdccj5g69s8q7zzjs7sgxn9ejhnvdh6gqjcy22mss2yexunagm5r2gqczh8k24cwrqml3njskm548aruhpwssq9nvrvz";
    const PAYMENT_HASH: &str = "2044f2c86d384a58c27274f7a3e037aa56e0a95fcc6a66d4674ae01742e6bee7";

    #[test]
    fn test_decode_extracts_payment_hash() {
        let decoded = decode_invoice(INVOICE).unwrap();
        assert_eq!(decoded.payment_hash, PAYMENT_HASH);
        assert_eq!(decoded.amount_msat, Some(11_000));
        assert_eq!(decoded.expiry, 604_800);
        assert_eq!(decoded.timestamp, 1_651_524_875);
        assert_eq!(decoded.bolt11, INVOICE);
    }

    #[test]
    fn test_decode_accepts_lightning_prefix() {
        let decoded = decode_invoice(&format!("LIGHTNING:{INVOICE}")).unwrap();
        assert_eq!(decoded.payment_hash, PAYMENT_HASH);
        assert_eq!(decoded.bolt11, INVOICE);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_invoice("not an invoice"),
            Err(InvoiceError::Parse(_))
        ));
        assert!(matches!(
            decode_invoice("  "),
            Err(InvoiceError::Validation(_))
        ));
    }
}
