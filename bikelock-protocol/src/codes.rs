//! Numeric request and response codes
//!
//! Request codes go out in the `state` field of every wire command.
//! Response codes come back in the `state` field of the server reply,
//! except for the 9xx band which is only ever produced locally.

/// Request code sent in the `state` field of a wire command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestCode {
    Rent,
    Return,
    Location,
    LocationFail,
    LowBattery,
}

impl RequestCode {
    /// Convert to wire value
    pub const fn to_u16(self) -> u16 {
        match self {
            RequestCode::Rent => 10,
            RequestCode::Return => 20,
            RequestCode::Location => 30,
            RequestCode::LocationFail => 31,
            RequestCode::LowBattery => 40,
        }
    }
}

/// Which layer produced a response code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseBand {
    /// The server understood and processed the request
    Information,
    /// The reply never arrived or could not be interpreted
    Transport,
}

/// Every response code the terminal knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseCode {
    // Information layer
    RentSuccess,
    RentFailUserOccupied,
    RentFailUserNonexistent,
    RentFailNegativeBalance,
    RentFailBikeOccupied,
    RentFailBikeUnavailable,
    ReturnSuccess,
    ReturnFailUserNotMatch,
    ReturnFailOrderNonexistent,
    LocationSuccess,
    /// Location stored; the server also flags the vehicle as unavailable
    LocationSuccessNotAvailable,
    LocationFail,
    LowBatterySuccess,
    LowBatteryFail,
    ErrorOther,

    // Transport and decode layer (client-local)
    ErrorStatus,
    ErrorRequestOvertime,
    ErrorInvalidResponse,
    ErrorDecode,
}

impl ResponseCode {
    /// Parse a code from its wire value
    pub fn from_u16(value: u16) -> Option<Self> {
        let code = match value {
            110 => ResponseCode::RentSuccess,
            120 => ResponseCode::RentFailUserOccupied,
            121 => ResponseCode::RentFailUserNonexistent,
            122 => ResponseCode::RentFailNegativeBalance,
            130 => ResponseCode::RentFailBikeOccupied,
            131 => ResponseCode::RentFailBikeUnavailable,
            210 => ResponseCode::ReturnSuccess,
            220 => ResponseCode::ReturnFailUserNotMatch,
            230 => ResponseCode::ReturnFailOrderNonexistent,
            310 => ResponseCode::LocationSuccess,
            320 => ResponseCode::LocationSuccessNotAvailable,
            330 => ResponseCode::LocationFail,
            410 => ResponseCode::LowBatterySuccess,
            420 => ResponseCode::LowBatteryFail,
            100 => ResponseCode::ErrorOther,
            900 => ResponseCode::ErrorStatus,
            910 => ResponseCode::ErrorRequestOvertime,
            920 => ResponseCode::ErrorInvalidResponse,
            930 => ResponseCode::ErrorDecode,
            _ => return None,
        };
        Some(code)
    }

    /// Convert to wire value
    pub const fn to_u16(self) -> u16 {
        match self {
            ResponseCode::RentSuccess => 110,
            ResponseCode::RentFailUserOccupied => 120,
            ResponseCode::RentFailUserNonexistent => 121,
            ResponseCode::RentFailNegativeBalance => 122,
            ResponseCode::RentFailBikeOccupied => 130,
            ResponseCode::RentFailBikeUnavailable => 131,
            ResponseCode::ReturnSuccess => 210,
            ResponseCode::ReturnFailUserNotMatch => 220,
            ResponseCode::ReturnFailOrderNonexistent => 230,
            ResponseCode::LocationSuccess => 310,
            ResponseCode::LocationSuccessNotAvailable => 320,
            ResponseCode::LocationFail => 330,
            ResponseCode::LowBatterySuccess => 410,
            ResponseCode::LowBatteryFail => 420,
            ResponseCode::ErrorOther => 100,
            ResponseCode::ErrorStatus => 900,
            ResponseCode::ErrorRequestOvertime => 910,
            ResponseCode::ErrorInvalidResponse => 920,
            ResponseCode::ErrorDecode => 930,
        }
    }

    /// Layer this code belongs to
    pub fn band(self) -> ResponseBand {
        if self.to_u16() >= 900 {
            ResponseBand::Transport
        } else {
            ResponseBand::Information
        }
    }

    /// Check if the reply for this code must carry ride details
    pub fn carries_details(self) -> bool {
        matches!(self, ResponseCode::RentSuccess | ResponseCode::ReturnSuccess)
    }

    /// Check if this is one of the server's success codes
    pub fn is_success(self) -> bool {
        matches!(
            self,
            ResponseCode::RentSuccess
                | ResponseCode::ReturnSuccess
                | ResponseCode::LocationSuccess
                | ResponseCode::LocationSuccessNotAvailable
                | ResponseCode::LowBatterySuccess
        )
    }
}
