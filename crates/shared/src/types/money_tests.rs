use super::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn test_amount_positive() {
    let amount = Amount::new(dec!(100.00)).unwrap();
    assert_eq!(amount.value(), dec!(100.00));
}

#[test]
fn test_amount_zero_rejected() {
    assert_eq!(Amount::new(Decimal::ZERO), Err(AmountError::Zero));
}

#[test]
fn test_amount_negative_rejected() {
    assert_eq!(
        Amount::new(dec!(-5)),
        Err(AmountError::Negative(dec!(-5)))
    );
}

#[test]
fn test_amount_display() {
    assert_eq!(Amount::new(dec!(12.50)).unwrap().to_string(), "12.50");
}

#[test]
fn test_amount_deserialize_validates() {
    let ok: Amount = serde_json::from_str("\"250.75\"").unwrap();
    assert_eq!(ok.value(), dec!(250.75));

    assert!(serde_json::from_str::<Amount>("\"0\"").is_err());
    assert!(serde_json::from_str::<Amount>("\"-1\"").is_err());
}

#[test]
fn test_amount_scale_bounded_by_storage() {
    assert_eq!(Amount::new(dec!(0.0001)).unwrap().value(), dec!(0.0001));
    // Trailing zeros do not count.
    assert!(Amount::new(dec!(1.500000)).is_ok());
    assert_eq!(
        Amount::new(dec!(0.00001)),
        Err(AmountError::TooPrecise { scale: 5 })
    );
}

#[test]
fn test_amount_magnitude_bounded_by_storage() {
    assert!(Amount::new(dec!(999999999999999.9999)).is_ok());
    assert_eq!(
        Amount::new(dec!(1000000000000000)),
        Err(AmountError::TooLarge(dec!(1000000000000000)))
    );
    assert_eq!(
        Amount::new(Decimal::MAX),
        Err(AmountError::TooLarge(Decimal::MAX))
    );
}
