use super::*;

#[test]
fn variant_messages_carry_context() {
    assert!(
        CeltimeError::validation("bad track")
            .to_string()
            .contains("validation error: bad track")
    );
    assert!(
        CeltimeError::animation("bad key")
            .to_string()
            .contains("animation error: bad key")
    );
    assert!(
        CeltimeError::history("no such action")
            .to_string()
            .contains("history error: no such action")
    );
    assert!(
        CeltimeError::playback("worker gone")
            .to_string()
            .contains("playback error: worker gone")
    );
    assert!(
        CeltimeError::serde("truncated")
            .to_string()
            .contains("serialization error: truncated")
    );
}

#[test]
fn anyhow_errors_pass_through_transparently() {
    let err: CeltimeError = anyhow::anyhow!("boom").into();
    assert!(matches!(err, CeltimeError::Other(_)));
    assert_eq!(err.to_string(), "boom");
}

#[test]
fn result_alias_composes_with_question_mark() {
    fn inner() -> CeltimeResult<u32> {
        Err(CeltimeError::validation("nope"))
    }
    fn outer() -> CeltimeResult<u32> {
        let v = inner()?;
        Ok(v)
    }
    assert!(outer().is_err());
}
