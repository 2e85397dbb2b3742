//! SQLite database handle for the Lnode server.

lnode_core::define_database!(Database, "Database migrations complete");
