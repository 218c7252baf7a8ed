//! Shared fixture models for the integration matrices.
#![allow(dead_code)]

use model_pack::{model, CalendarUnit, DurationValue, TimeZoneId};

model! {
    #[derive(Clone, Default)]
    pub struct Pair {
        pub a: i32,
        pub b: Option<String>,
    }
}

model! {
    #[derive(Clone, Default)]
    pub struct Schedule {
        pub interval: i32,
        pub unit: Option<CalendarUnit>,
        pub timezone: Option<TimeZoneId>,
        pub cron: Option<String>,
    }
}

model! {
    #[derive(Clone, Default)]
    pub struct Throttle {
        pub value: i64,
        pub period: Option<DurationValue>,
    }
}

model! {
    #[derive(Clone, Default)]
    pub struct Action {
        pub name: String,
        pub destination_id: String,
        pub throttle_enabled: bool,
        pub throttle: Option<Throttle>,
        pub subject: Option<String>,
    }
}

model! {
    #[derive(Clone, Default)]
    pub struct Trigger {
        pub id: String,
        pub severity: String,
        pub condition: Option<String>,
        pub actions: Vec<Action>,
    }
}

model! {
    #[derive(Clone, Default)]
    pub struct Monitor {
        pub name: String,
        pub enabled: bool,
        pub schedule: Schedule,
        pub last_update_time: Option<i64>,
        pub indices: Vec<String>,
        pub triggers: Vec<Trigger>,
        pub(crate) revision: i64,
    }
}

model! {
    #[derive(Default)]
    pub struct WithFloat {
        pub name: String,
        pub score: f32,
    }
}

model! {
    #[derive(Default)]
    pub struct Wrapper {
        pub inner: Option<WithFloat>,
    }
}

pub fn schedule() -> Schedule {
    Schedule {
        interval: 5,
        unit: Some(CalendarUnit::Minutes),
        timezone: Some(TimeZoneId::parse("America/Los_Angeles").unwrap()),
        cron: None,
    }
}

pub fn action(name: &str, throttled: bool) -> Action {
    Action {
        name: name.into(),
        destination_id: format!("dest-{name}"),
        throttle_enabled: throttled,
        throttle: throttled.then(|| Throttle {
            value: 10,
            period: Some(DurationValue::minutes(10)),
        }),
        subject: Some(format!("alert from {name}")),
    }
}

pub fn monitor() -> Monitor {
    Monitor {
        name: "cpu-high".into(),
        enabled: true,
        schedule: schedule(),
        last_update_time: Some(1_700_000_000_000),
        indices: vec!["logs-*".into(), "metrics".into()],
        triggers: vec![
            Trigger {
                id: "t1".into(),
                severity: "1".into(),
                condition: Some("ctx.results[0].hits.total > 0".into()),
                actions: vec![action("page", true), action("email", false)],
            },
            Trigger {
                id: "t2".into(),
                severity: "3".into(),
                condition: None,
                actions: Vec::new(),
            },
        ],
        revision: 7,
    }
}
