use zw_core::submodule;

submodule!(assign_return_route);
submodule!(get_node_protocol_info);
submodule!(is_failed_node);
submodule!(request_node_info);
