//! Register definitions for the BMM150
//!
//! Only the registers the driver touches are described. Every register is a
//! single byte and is accessed whole; the driver writes the enumerant values
//! from [`crate::config`] straight through.
//!
//! ## Aliased addresses
//! - **0x4C**: operation mode and mode/rate share one physical register. Writing
//!   a data rate overwrites the operation mode and vice versa.
//! - **0x4E**: axis-enable and preset mode share one physical register. The last
//!   write wins, so callers must sequence these writes deliberately.
//!
//! Both pairs are declared with `ALLOW_ADDRESS_OVERLAP = true`.

device_driver::create_device!(
    device_name: Bmm150,
    dsl: {
        config {
            type RegisterAddressType = u8;
            type DefaultByteOrder = LE;
        }

        /// CHIP_ID - Chip Identification (0x40)
        /// Expected value: 0x32
        register ChipId {
            const ADDRESS = 0x40;
            const SIZE_BITS = 8;

            /// Chip identity (should read 0x32)
            chip_id: uint = 0..8,
        },

        /// DATA_X_LSB - X-axis Data Low Byte (0x42)
        register DataXLsb {
            const ADDRESS = 0x42;
            const SIZE_BITS = 8;

            /// X-axis data low byte
            data_x_lsb: uint = 0..8,
        },

        /// DATA_X_MSB - X-axis Data High Byte (0x43)
        register DataXMsb {
            const ADDRESS = 0x43;
            const SIZE_BITS = 8;

            /// X-axis data high byte
            data_x_msb: uint = 0..8,
        },

        /// DATA_Y_LSB - Y-axis Data Low Byte (0x44)
        register DataYLsb {
            const ADDRESS = 0x44;
            const SIZE_BITS = 8;

            /// Y-axis data low byte
            data_y_lsb: uint = 0..8,
        },

        /// DATA_Y_MSB - Y-axis Data High Byte (0x45)
        register DataYMsb {
            const ADDRESS = 0x45;
            const SIZE_BITS = 8;

            /// Y-axis data high byte
            data_y_msb: uint = 0..8,
        },

        /// DATA_Z_LSB - Z-axis Data Low Byte (0x46)
        register DataZLsb {
            const ADDRESS = 0x46;
            const SIZE_BITS = 8;

            /// Z-axis data low byte
            data_z_lsb: uint = 0..8,
        },

        /// DATA_Z_MSB - Z-axis Data High Byte (0x47)
        register DataZMsb {
            const ADDRESS = 0x47;
            const SIZE_BITS = 8;

            /// Z-axis data high byte
            data_z_msb: uint = 0..8,
        },

        /// POWER_CTRL - Power Control (0x4B)
        register PowerCtrl {
            const ADDRESS = 0x4B;
            const SIZE_BITS = 8;

            /// Power state (0x01 = on, 0x00 = off)
            power_ctrl: uint = 0..8,
        },

        /// OP_MODE - Operation Mode (0x4C, aliases MODE_RATE)
        register OpMode {
            const ADDRESS = 0x4C;
            const SIZE_BITS = 8;
            const ALLOW_ADDRESS_OVERLAP = true;

            /// Operation mode (0x00 = normal, 0x03 = sleep)
            op_mode: uint = 0..8,
        },

        /// MODE_RATE - Data Rate (0x4C, aliases OP_MODE)
        register ModeRate {
            const ADDRESS = 0x4C;
            const SIZE_BITS = 8;
            const ALLOW_ADDRESS_OVERLAP = true;

            /// Output data rate (0x00 = 10 Hz)
            mode_rate: uint = 0..8,
        },

        /// AXES_ENABLE - Axis Enable (0x4E, aliases PRESET_MODE)
        register AxesEnable {
            const ADDRESS = 0x4E;
            const SIZE_BITS = 8;
            const ALLOW_ADDRESS_OVERLAP = true;

            /// Axis enable bits (0x00 = X, Y and Z enabled)
            axes_enable: uint = 0..8,
        },

        /// PRESET_MODE - Preset Mode (0x4E, aliases AXES_ENABLE)
        register PresetMode {
            const ADDRESS = 0x4E;
            const SIZE_BITS = 8;
            const ALLOW_ADDRESS_OVERLAP = true;

            /// Preset selection (0x03 = high accuracy)
            preset_mode: uint = 0..8,
        }
    }
);
