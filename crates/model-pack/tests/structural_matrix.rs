//! Catalog, dispatch and structural operation matrix.

mod common;

use std::collections::HashSet;

use common::{action, monitor, schedule, Action, Monitor, Pair, Schedule, WithFloat};
use model_pack::structural::{equals, hash_of, to_string};
use model_pack::{fields_of, ModelError, TypeTag};

#[test]
fn catalog_is_sorted_and_stable() {
    let names: Vec<_> = fields_of::<Monitor>()
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(
        names,
        ["enabled", "indices", "last_update_time", "name", "schedule", "triggers"]
    );
    for _ in 0..5 {
        assert_eq!(
            fields_of::<Monitor>().unwrap(),
            fields_of::<Monitor>().unwrap()
        );
    }
}

#[test]
fn catalog_tags() {
    let tags: Vec<_> = fields_of::<Monitor>()
        .unwrap()
        .into_iter()
        .map(|f| f.tag.describe())
        .collect();
    assert_eq!(
        tags,
        ["bool", "list of strings", "long", "string", "Schedule", "list of Trigger"]
    );
    let tags: Vec<_> = fields_of::<Schedule>().unwrap().into_iter().map(|f| f.tag).collect();
    assert_eq!(
        tags,
        [TypeTag::Str, TypeTag::Int, TypeTag::TimeZone, TypeTag::CalendarUnit]
    );
}

#[test]
fn unsupported_field_is_identified() {
    let err = fields_of::<WithFloat>().unwrap_err();
    assert!(matches!(
        err,
        ModelError::UnsupportedField { model: "WithFloat", field: "score", ref type_name } if type_name == "f32"
    ));
    assert_eq!(
        err.to_string(),
        "unsupported field type f32 for field `score` in model WithFloat"
    );
}

#[test]
fn equality_and_hash_agree() {
    let a = monitor();
    let b = monitor();
    assert!(equals(&a, &b));
    assert_eq!(hash_of(&a), hash_of(&b));

    let mut c = monitor();
    c.triggers[0].actions[1].subject = None;
    assert!(!equals(&a, &c));
    assert_ne!(a, c);

    let set: HashSet<Action> = [action("x", true), action("x", true), action("y", false)]
        .into_iter()
        .collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn equality_requires_same_type() {
    assert!(!equals(&Pair::default(), &Schedule::default()));
    assert!(equals(&Pair::default(), &Pair::default()));
}

#[test]
fn rendering() {
    assert_eq!(
        to_string(&Pair {
            a: 3,
            b: Some("x".into())
        }),
        "Pair[a=3,b=x]"
    );
    assert_eq!(
        schedule().to_string(),
        "Schedule[cron=null,interval=5,timezone=America/Los_Angeles,unit=MINUTES]"
    );
    assert_eq!(
        format!("{:?}", action("p", true)),
        "Action[destination_id=dest-p,name=p,subject=alert from p,throttle=Throttle[period=10m,value=10],throttle_enabled=true]"
    );
}

#[test]
fn unsupported_field_values_still_count() {
    let a = WithFloat {
        name: "n".into(),
        score: 1.0,
    };
    let b = WithFloat {
        name: "n".into(),
        score: 2.0,
    };
    assert!(!equals(&a, &b));
    assert_ne!(hash_of(&a), hash_of(&b));
    assert_eq!(a.to_string(), "WithFloat[name=n,score=1.0]");
    let same = WithFloat {
        name: "n".into(),
        score: 1.0,
    };
    assert_eq!(a, same);
    assert_eq!(hash_of(&a), hash_of(&same));
}
