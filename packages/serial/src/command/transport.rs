use zw_core::submodule;

submodule!(application_command);
submodule!(bridge_application_command);
submodule!(send_data);
submodule!(send_data_multicast);
