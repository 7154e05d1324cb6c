use zw_core::submodule;

submodule!(get_random);
