use crate::submodule;

submodule!(command_class_info);
submodule!(command_classes);
submodule!(command_type);
submodule!(data_rate);
submodule!(frequent_listening);
submodule!(function_type);
submodule!(node_id);
submodule!(node_info);
submodule!(node_type);
submodule!(protocol_version);
submodule!(rssi);
submodule!(transmit_options);
submodule!(transmit_status);
