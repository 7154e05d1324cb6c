use zw_core::submodule;

submodule!(get_controller_id);
submodule!(get_serial_api_init_data);
