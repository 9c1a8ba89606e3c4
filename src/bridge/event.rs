use std::fmt;

/// Tokens sent by the remote devices. Each one is compared by equality,
/// except `MAILBOX_TEMPERATURE` which carries a `:value` suffix.
pub mod tokens {
    pub const MAILBOX_DOOR_OPENED: &str = "MailboxDoorOpened";
    pub const MULE_ALARM: &str = "MuleAlarm";
    pub const MAILBOX_TEMPERATURE: &str = "MailboxTemperature";
    pub const CHARGER_CHARGE_STATUS_ON: &str = "ChargerChargeStatusOn";
    pub const CHARGER_CHARGE_STATUS_OFF: &str = "ChargerChargeStatusOff";
    pub const CHARGER_POWER_SOURCE_GOOD: &str = "ChargerPowerSourceGood";
    pub const CHARGER_POWER_SOURCE_BAD: &str = "ChargerPowerSourceBad";
    pub const ROAD_MAIN_LOOP_HEARTBEAT: &str = "RoadMainLoopHeartbeat";
    pub const GATEWAY_MAIN_LOOP_HEARTBEAT: &str = "GatewayMainLoopHeartbeat";
    pub const CAR_COUNTER_HEARTBEAT: &str = "CarCounterHeartbeat";
    pub const CAR_ARRIVED: &str = "CarArrived";
    pub const CAR_DEPARTED: &str = "CarDeparted";
    pub const CAR_COUNTER_ERROR: &str = "CarCounterError";
    pub const CAR_FALSE_ALARM: &str = "CarFalseAlarm";
    pub const CAR_HEARD_SOUND: &str = "CarHeardSound";

    /// Separates the key from the numeric field in payload tokens.
    pub const PAYLOAD_SEPARATOR: char = ':';
}

/// One complete decoded token extracted from the raw stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord(String);

impl MessageRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Lossy decode: invalid UTF-8 becomes U+FFFD, which no token contains.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerSource {
    Good,
    Bad,
}

/// Which device loop a heartbeat came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatSource {
    Road,
    Gateway,
    CarCounter,
}

/// Semantic classification of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    DoorOpened,
    MuleAlarm,
    TemperatureReading(f64),
    ChargeStatus(Switch),
    PowerSourceStatus(PowerSource),
    Heartbeat(HeartbeatSource),
    Arrived,
    Departed,
    CountingError,
    FalseAlarm,
    HeardSound,
    Unrecognized(String),
}

impl EventKind {
    /// Looks up a literal token. Payload tokens never match here.
    pub fn from_token(token: &str) -> Option<Self> {
        use tokens::*;

        let kind = match token {
            MAILBOX_DOOR_OPENED => EventKind::DoorOpened,
            MULE_ALARM => EventKind::MuleAlarm,
            CHARGER_CHARGE_STATUS_ON => EventKind::ChargeStatus(Switch::On),
            CHARGER_CHARGE_STATUS_OFF => EventKind::ChargeStatus(Switch::Off),
            CHARGER_POWER_SOURCE_GOOD => EventKind::PowerSourceStatus(PowerSource::Good),
            CHARGER_POWER_SOURCE_BAD => EventKind::PowerSourceStatus(PowerSource::Bad),
            ROAD_MAIN_LOOP_HEARTBEAT => EventKind::Heartbeat(HeartbeatSource::Road),
            GATEWAY_MAIN_LOOP_HEARTBEAT => EventKind::Heartbeat(HeartbeatSource::Gateway),
            CAR_COUNTER_HEARTBEAT => EventKind::Heartbeat(HeartbeatSource::CarCounter),
            CAR_ARRIVED => EventKind::Arrived,
            CAR_DEPARTED => EventKind::Departed,
            CAR_COUNTER_ERROR => EventKind::CountingError,
            CAR_FALSE_ALARM => EventKind::FalseAlarm,
            CAR_HEARD_SOUND => EventKind::HeardSound,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, EventKind::Unrecognized(_))
    }
}
