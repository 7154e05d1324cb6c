use zw_core::submodule;

submodule!(application_update);
