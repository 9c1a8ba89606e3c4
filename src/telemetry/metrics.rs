use crate::bridge::event::{EventKind, HeartbeatSource, PowerSource, Switch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: &'static str,
    pub kind: MetricKind,
    pub help: &'static str,
}

impl MetricDescriptor {
    pub const fn counter(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            help,
        }
    }

    pub const fn gauge(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            help,
        }
    }
}

pub const DOOR_OPENED: &str = "mbx_mailbox_door_opened_count";
pub const MULE_ALARM: &str = "mbx_mule_alarm_count";
pub const TEMPERATURE: &str = "mbx_temperature_fahrenheit";
pub const CHARGE_STATUS: &str = "mbx_charger_charge_status";
pub const POWER_STATUS: &str = "mbx_charger_power_status";
pub const ROAD_HEARTBEAT: &str = "mbx_road_main_loop_heartbeat_count";
pub const GATEWAY_HEARTBEAT: &str = "mbx_gateway_main_loop_heartbeat_count";
pub const CAR_COUNTER_HEARTBEAT: &str = "cc_heartbeat_count";
pub const CAR_ARRIVED: &str = "cc_car_arrived_count";
pub const CAR_DEPARTED: &str = "cc_car_departed_count";
pub const COUNTING_ERROR: &str = "cc_counting_error_count";
pub const FALSE_ALARM: &str = "cc_false_alarm_count";
pub const HEARD_SOUND: &str = "cc_heard_sound_count";

/// Every metric the bridge exposes. Registered once at startup.
pub const DESCRIPTORS: &[MetricDescriptor] = &[
    MetricDescriptor::counter(DOOR_OPENED, "No of times the mailbox door has been opened"),
    MetricDescriptor::counter(MULE_ALARM, "No of times the mule alarm has gone off"),
    MetricDescriptor::gauge(
        TEMPERATURE,
        "The temperature reading in fahrenheit from the device on the mailbox",
    ),
    MetricDescriptor::gauge(CHARGE_STATUS, "The charger's charge status, 0=off, 1=on"),
    MetricDescriptor::gauge(POWER_STATUS, "The charger's power source status, 0=bad, 1=good"),
    MetricDescriptor::counter(
        ROAD_HEARTBEAT,
        "Heartbeat counter for the main loop for the device down on the road",
    ),
    MetricDescriptor::counter(
        GATEWAY_HEARTBEAT,
        "Heartbeat counter for the main loop of the gateway device",
    ),
    MetricDescriptor::counter(CAR_COUNTER_HEARTBEAT, "Heartbeat counter for the car counter"),
    MetricDescriptor::counter(CAR_ARRIVED, "No of cars that have arrived"),
    MetricDescriptor::counter(CAR_DEPARTED, "No of cars that have departed"),
    MetricDescriptor::counter(COUNTING_ERROR, "No of car counting errors"),
    MetricDescriptor::counter(FALSE_ALARM, "No of car counter false alarms"),
    MetricDescriptor::counter(HEARD_SOUND, "No of sounds heard by the car counter"),
];

/// The single registry mutation an event produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricAction {
    Increment(&'static str),
    Set(&'static str, f64),
}

/// Fixed EventKind -> metric mapping. `None` for events with no observable effect.
pub fn action_for(event: &EventKind) -> Option<MetricAction> {
    let action = match event {
        EventKind::DoorOpened => MetricAction::Increment(DOOR_OPENED),
        EventKind::MuleAlarm => MetricAction::Increment(MULE_ALARM),
        EventKind::TemperatureReading(value) => MetricAction::Set(TEMPERATURE, *value),
        EventKind::ChargeStatus(Switch::On) => MetricAction::Set(CHARGE_STATUS, 1.0),
        EventKind::ChargeStatus(Switch::Off) => MetricAction::Set(CHARGE_STATUS, 0.0),
        EventKind::PowerSourceStatus(PowerSource::Good) => MetricAction::Set(POWER_STATUS, 1.0),
        EventKind::PowerSourceStatus(PowerSource::Bad) => MetricAction::Set(POWER_STATUS, 0.0),
        EventKind::Heartbeat(HeartbeatSource::Road) => MetricAction::Increment(ROAD_HEARTBEAT),
        EventKind::Heartbeat(HeartbeatSource::Gateway) => {
            MetricAction::Increment(GATEWAY_HEARTBEAT)
        }
        EventKind::Heartbeat(HeartbeatSource::CarCounter) => {
            MetricAction::Increment(CAR_COUNTER_HEARTBEAT)
        }
        EventKind::Arrived => MetricAction::Increment(CAR_ARRIVED),
        EventKind::Departed => MetricAction::Increment(CAR_DEPARTED),
        EventKind::CountingError => MetricAction::Increment(COUNTING_ERROR),
        EventKind::FalseAlarm => MetricAction::Increment(FALSE_ALARM),
        EventKind::HeardSound => MetricAction::Increment(HEARD_SOUND),
        EventKind::Unrecognized(_) => return None,
    };
    Some(action)
}
