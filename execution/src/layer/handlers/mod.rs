mod casino;
