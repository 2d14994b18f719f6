// Address types
pub const PUBLIC_DEVICE_ADDRESS: u8 = 0x00;
pub const RANDOM_DEVICE_ADDRESS: u8 = 0x01;
pub const PUBLIC_IDENTITY_ADDRESS: u8 = 0x02;
pub const RANDOM_IDENTITY_ADDRESS: u8 = 0x03;

// LE Scan parameters
pub const LE_SCAN_ACTIVE: bool = true;
pub const LE_SCAN_INTERVAL: u16 = 0x0010; // 10 ms in 0.625 ms units
pub const LE_SCAN_WINDOW: u16 = 0x0010; // 10 ms in 0.625 ms units
pub const LE_SCAN_TIMEOUT: u16 = 0x0000; // scan until stopped

// LE Connection parameters
pub const LE_CONN_INTERVAL_MIN: u16 = 0x0006; // 7.5 ms
pub const LE_CONN_INTERVAL_MAX: u16 = 0x0008; // 10 ms
pub const LE_CONN_LATENCY: u16 = 0x0000;
pub const LE_SUPERVISION_TIMEOUT: u16 = 0x0048; // 720 ms

// Advertising Data Types
pub const ADV_TYPE_FLAGS: u8 = 0x01;
pub const ADV_TYPE_16BIT_SERVICE_UUID_PARTIAL: u8 = 0x02;
pub const ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE: u8 = 0x03;
pub const ADV_TYPE_32BIT_SERVICE_UUID_PARTIAL: u8 = 0x04;
pub const ADV_TYPE_32BIT_SERVICE_UUID_COMPLETE: u8 = 0x05;
pub const ADV_TYPE_128BIT_SERVICE_UUID_PARTIAL: u8 = 0x06;
pub const ADV_TYPE_128BIT_SERVICE_UUID_COMPLETE: u8 = 0x07;
pub const ADV_TYPE_SHORT_LOCAL_NAME: u8 = 0x08;
pub const ADV_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;
pub const ADV_TYPE_TX_POWER_LEVEL: u8 = 0x0A;
pub const ADV_TYPE_CLASS_OF_DEVICE: u8 = 0x0D;
pub const ADV_TYPE_DEVICE_ID: u8 = 0x10;
pub const ADV_TYPE_APPEARANCE: u8 = 0x19;
pub const ADV_TYPE_MANUFACTURER_SPECIFIC: u8 = 0xFF;
