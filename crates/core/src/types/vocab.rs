//! Closed vocabularies stored as text columns.
//!
//! Sessions record the device they came from, page views record which kind of
//! page was hit, and purchases record how they were paid for. The database
//! stores the lowercase wire name; anything else is rejected on the way out.

use serde::{Deserialize, Serialize};

/// Error returned when a stored or user-supplied value is not in a vocabulary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct VocabError {
    /// Which vocabulary rejected the value.
    pub kind: &'static str,
    /// The offending input.
    pub value: String,
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident as $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The lowercase name used in the database and on the wire.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = VocabError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Self::$variant), )+
                    _ => Err(VocabError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

vocabulary! {
    /// Device class a browsing session was recorded on.
    DeviceType as "device type" {
        Mobile => "mobile",
        Desktop => "desktop",
        Tablet => "tablet",
    }
}

vocabulary! {
    /// Kind of page a page view landed on.
    PageType as "page type" {
        Product => "product",
        Category => "category",
        Home => "home",
        Cart => "cart",
        Checkout => "checkout",
    }
}

vocabulary! {
    /// Payment method attached to a purchase.
    PaymentMethod as "payment method" {
        CreditCard => "credit_card",
        DebitCard => "debit_card",
        Paypal => "paypal",
        ApplePay => "apple_pay",
        GooglePay => "google_pay",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_serde() {
        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(method).expect("serialize");
            assert_eq!(json, format!("\"{}\"", method.as_str()));
        }
    }

    #[test]
    fn test_parse_known_values() {
        assert_eq!("tablet".parse::<DeviceType>(), Ok(DeviceType::Tablet));
        assert_eq!("checkout".parse::<PageType>(), Ok(PageType::Checkout));
        assert_eq!(
            "apple_pay".parse::<PaymentMethod>(),
            Ok(PaymentMethod::ApplePay)
        );
    }

    #[test]
    fn test_parse_rejects_unknown_value() {
        let err = "smartwatch".parse::<DeviceType>().unwrap_err();
        assert_eq!(err.to_string(), "invalid device type: smartwatch");

        // Matching is exact; stored values are always lowercase.
        assert!("Mobile".parse::<DeviceType>().is_err());
    }
}
