use shared::{error::StampError, protocol::StampConfig};

/// Decides whether `config` may be sent to the render service under
/// `page_limit`. Rules run in order and the first failure wins.
///
/// An absent template is deliberately not a rule here: the preview scheduler
/// silently no-ops without one and export reports
/// [`StampError::NoTemplate`] itself.
pub fn validate(config: &StampConfig, page_limit: u32) -> Result<(), StampError> {
    if !config.include_qr && !config.include_barcode {
        return Err(StampError::NoCodeTypeSelected);
    }
    let range = config.page_count();
    if range > i64::from(page_limit) {
        return Err(StampError::RangeExceeded {
            range,
            limit: page_limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::ConfigUpdate;

    #[test]
    fn small_range_passes() {
        let config = StampConfig::default()
            .apply(ConfigUpdate::StartValue(1))
            .apply(ConfigUpdate::EndValue(10));
        assert_eq!(validate(&config, 100), Ok(()));
    }

    #[test]
    fn oversized_range_reports_both_numbers() {
        let config = StampConfig::default().apply(ConfigUpdate::EndValue(150));
        assert_eq!(
            validate(&config, 100),
            Err(StampError::RangeExceeded {
                range: 150,
                limit: 100
            })
        );
    }

    #[test]
    fn range_exactly_at_limit_passes() {
        let config = StampConfig::default().apply(ConfigUpdate::EndValue(100));
        assert_eq!(validate(&config, 100), Ok(()));
    }

    #[test]
    fn no_code_type_wins_over_range() {
        let config = StampConfig::default()
            .apply(ConfigUpdate::IncludeQr(false))
            .apply(ConfigUpdate::IncludeBarcode(false))
            .apply(ConfigUpdate::EndValue(10_000));
        assert_eq!(validate(&config, 100), Err(StampError::NoCodeTypeSelected));
    }

    #[test]
    fn barcode_alone_satisfies_code_type_rule() {
        let config = StampConfig::default()
            .apply(ConfigUpdate::IncludeQr(false))
            .apply(ConfigUpdate::IncludeBarcode(true));
        assert_eq!(validate(&config, 100), Ok(()));
    }

    #[test]
    fn inverted_range_is_not_an_overflow() {
        let config = StampConfig::default()
            .apply(ConfigUpdate::StartValue(10))
            .apply(ConfigUpdate::EndValue(1));
        assert_eq!(validate(&config, 100), Ok(()));
    }
}
