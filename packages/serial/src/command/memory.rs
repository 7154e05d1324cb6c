use zw_core::submodule;

submodule!(ext_nvm_read_long_buffer);
submodule!(memory_get_byte);
