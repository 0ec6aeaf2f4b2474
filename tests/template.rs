#[cfg(test)]
mod tests {
    use clasp::{
        Direction, Fault, ParamType, ParamValue, ProcessedTemplate, Value,
    };
    use indoc::indoc;
    use std::collections::HashMap;

    fn values(pairs: &[(&str, Value)]) -> HashMap<String, ParamValue> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), ParamValue::Host(value.clone())))
            .collect()
    }

    #[test]
    fn single_placeholder() {
        let template = ProcessedTemplate::process("INSERT :name INTO t").unwrap();
        assert_eq!(template.sql(), "INSERT ? INTO t");
        assert_eq!(template.names(), ["name"]);
        assert_eq!(template.spans(), [(7, 12)]);
        assert!(!template.is_filled());
        let filled = template
            .fill(&values(&[("name", Value::from("x"))]))
            .unwrap();
        assert!(filled.is_filled());
        assert_eq!(
            filled.values().unwrap(),
            [ParamValue::Host(Value::Varchar(Some("x".into())))]
        );
        let store = filled.to_store().unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.name_at(0), Some("name"));
    }

    #[test]
    fn repeated_name_yields_one_slot_per_occurrence() {
        let template = ProcessedTemplate::process("SELECT * WHERE a = :a AND b = :a").unwrap();
        assert_eq!(template.sql(), "SELECT * WHERE a = ? AND b = ?");
        assert_eq!(template.names(), ["a", "a"]);
        let store = template
            .fill(&values(&[("a", Value::Int32(Some(5)))]))
            .unwrap()
            .to_store()
            .unwrap();
        assert_eq!(store.positions("a"), vec![0, 1]);
        for position in 0..2 {
            assert_eq!(
                store.get_by_position(position),
                Some(&ParamValue::Host(Value::Int32(Some(5))))
            );
        }
    }

    #[test]
    fn no_placeholders_is_not_a_fault() {
        let template = ProcessedTemplate::process("SELECT 1").unwrap();
        assert_eq!(template.sql(), "SELECT 1");
        assert!(template.names().is_empty());
        let store = template.fill(&HashMap::new()).unwrap().to_store().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn quoted_text_and_comments_are_untouched() {
        let template = ProcessedTemplate::process(indoc! {"
            SELECT ':ignored' AS a, \":also\" AS b -- not this :one
            FROM t /* nor :this
            one */ WHERE c = :real AND d = 'it''s :not here'
        "})
        .unwrap();
        assert_eq!(template.names(), ["real"]);
        assert!(template.sql().contains("':ignored'"));
        assert!(template.sql().contains(":one"));
        assert!(template.sql().contains(":this"));
        assert!(template.sql().contains(":not here"));
        assert!(template.sql().contains("c = ? AND"));
    }

    #[test]
    fn placeholders_need_separators_on_both_sides() {
        let template = ProcessedTemplate::process("SELECT a:b, x::integer, c = :c").unwrap();
        assert_eq!(template.names(), ["c"]);
        assert_eq!(template.sql(), "SELECT a:b, x::integer, c = ?");
    }

    #[test]
    fn names_are_lower_cased() {
        let template = ProcessedTemplate::process("WHERE id = :UserId").unwrap();
        assert_eq!(template.names(), ["userid"]);
        let store = template
            .fill(&values(&[("USERID", Value::Int64(Some(3)))]))
            .unwrap()
            .to_store()
            .unwrap();
        assert_eq!(
            store.get("userid"),
            Some(&ParamValue::Host(Value::Int64(Some(3))))
        );
    }

    #[test]
    fn extended_syntax_records_hints() {
        let template =
            ProcessedTemplate::process("CALL p(#{doc,type=CLOB}, #{count,mode=OUT}, :plain)")
                .unwrap();
        assert_eq!(template.sql(), "CALL p(?, ?, ?)");
        assert_eq!(template.names(), ["doc", "count", "plain"]);
        assert_eq!(template.hints()[0].ty, Some(ParamType::Clob));
        assert_eq!(template.hints()[0].direction, None);
        assert_eq!(template.hints()[1].direction, Some(Direction::Out));
        assert_eq!(template.hints()[2].ty, None);
        let store = template
            .fill(&values(&[
                ("doc", Value::from("<xml/>")),
                ("count", Value::Null),
                ("plain", Value::Int32(Some(1))),
            ]))
            .unwrap()
            .to_store()
            .unwrap();
        assert_eq!(store.entry("doc").unwrap().ty, ParamType::Clob);
        assert_eq!(store.entry("count").unwrap().direction, Direction::Out);
        assert_eq!(store.entry("plain").unwrap().ty, ParamType::Scalar);
    }

    #[test]
    fn unknown_scalar_type_names_pass_through() {
        let template = ProcessedTemplate::process("VALUES (#{n,type=INTEGER})").unwrap();
        assert_eq!(template.hints()[0].ty, Some(ParamType::Scalar));
    }

    #[test]
    fn malformed_extended_bodies_are_template_faults() {
        for template in [
            "VALUES (#{})",
            "VALUES (#{1bad})",
            "VALUES (#{n,type})",
            "VALUES (#{n,shape=BLOB})",
            "VALUES (#{n,mode=SIDEWAYS})",
            "VALUES (#{n,type=BLOB,type=CLOB})",
        ] {
            let error = ProcessedTemplate::process(template).unwrap_err();
            assert!(
                matches!(error.downcast_ref::<Fault>(), Some(Fault::Template(..))),
                "expected a template fault for `{}`",
                template,
            );
        }
    }

    #[test]
    fn long_multibyte_templates_are_clipped_in_fault_messages() {
        // A two byte char straddles the clipping offset of the message cap.
        let template = format!("{}é WHERE a = :a", "x".repeat(496));
        let error = ProcessedTemplate::process(&template)
            .unwrap()
            .fill(&HashMap::new())
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Fault>(),
            Some(Fault::Binding(..))
        ));
        let message = format!("{}", error);
        assert!(message.contains("xxx..."));
        assert!(!message.contains('é'));
    }

    #[test]
    fn missing_name_is_a_binding_fault() {
        let template = ProcessedTemplate::process("WHERE a = :a AND b = :b").unwrap();
        let error = template
            .fill(&values(&[("a", Value::Int32(Some(1)))]))
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Fault>(),
            Some(Fault::Binding(..))
        ));
    }

    #[test]
    fn positional_fill_requires_an_exact_count() {
        let template = ProcessedTemplate::process("WHERE a = :a AND b = :a").unwrap();
        let error = template
            .fill_positional(vec![Value::Int32(Some(1)).into()])
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Fault>(),
            Some(Fault::Binding(..))
        ));
        let filled = template
            .fill_positional(vec![
                Value::Int32(Some(1)).into(),
                Value::Int32(Some(1)).into(),
            ])
            .unwrap();
        assert_eq!(filled.to_store().unwrap().positions("a"), vec![0, 1]);
    }

    #[test]
    fn unfilled_template_cannot_build_a_store() {
        let template = ProcessedTemplate::process("WHERE a = :a").unwrap();
        let error = template.to_store().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Fault>(),
            Some(Fault::Binding(..))
        ));
    }
}
